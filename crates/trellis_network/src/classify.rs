//! Constraint classification.
//!
//! A single constraint is *constant* if it reads no variable, *alpha* if it
//! reads only the pattern's own variable, and *beta* if it reads any other
//! variable bound earlier in the rule. The class depends only on the
//! variable set, never on declaration order.

use trellis_foundation::{Error, Result};
use trellis_model::{Constraint, SingleConstraint, Variable};

use crate::context::BuildContext;

/// How a single constraint is attached.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstraintClass {
    /// Reads nothing; skipped.
    Constant,
    /// Reads only the pattern variable; an alpha filter.
    Alpha,
    /// Reads an earlier binding; part of the pattern's beta node.
    Beta,
}

/// Classifies one constraint.
///
/// # Errors
/// Fails with a structural violation if the constraint reads a variable
/// that is neither the pattern's own nor bound in `ctx`.
pub fn classify(
    constraint: &SingleConstraint,
    own: &Variable,
    ctx: &BuildContext,
) -> Result<ConstraintClass> {
    if constraint.is_constant() {
        return Ok(ConstraintClass::Constant);
    }
    let mut class = ConstraintClass::Alpha;
    for variable in &constraint.variables {
        if variable == own {
            continue;
        }
        if ctx.offset_of(variable).is_none() {
            return Err(Error::structural(format!(
                "constraint {} reads unbound variable {variable:?}",
                constraint.predicate.key()
            )));
        }
        class = ConstraintClass::Beta;
    }
    Ok(class)
}

/// A pattern's constraints split by class, each in declaration order.
#[derive(Debug, Default)]
pub struct Classified<'a> {
    /// Skipped constraints.
    pub constant: Vec<&'a SingleConstraint>,
    /// Alpha filters.
    pub alpha: Vec<&'a SingleConstraint>,
    /// Constraints for the pattern's single beta node.
    pub beta: Vec<&'a SingleConstraint>,
}

/// Classifies every single constraint of `constraint`, descending through
/// nested conjunctions.
///
/// # Errors
/// Propagates the first classification failure.
pub fn partition<'a>(
    constraint: &'a Constraint,
    own: &Variable,
    ctx: &BuildContext,
) -> Result<Classified<'a>> {
    let mut out = Classified::default();
    for single in constraint.singles() {
        match classify(single, own, ctx)? {
            ConstraintClass::Constant => out.constant.push(single),
            ConstraintClass::Alpha => out.alpha.push(single),
            ConstraintClass::Beta => out.beta.push(single),
        }
    }
    Ok(out)
}
