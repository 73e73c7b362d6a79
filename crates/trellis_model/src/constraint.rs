//! Constraints: opaque predicates over named bound variables.

use std::fmt;
use std::sync::Arc;

use trellis_foundation::{Result, Value};

use crate::variable::Variable;

type PredicateFn = dyn Fn(&[Value]) -> Result<bool> + Send + Sync;

/// An opaque boolean callable.
///
/// The key identifies the predicate for node sharing: two predicates with
/// equal keys are treated as interchangeable, so an authoring surface must
/// give structurally different predicates different keys.
#[derive(Clone)]
pub struct Predicate {
    key: Arc<str>,
    func: Arc<PredicateFn>,
}

impl Predicate {
    /// Creates a predicate over an argument slice.
    pub fn new<F>(key: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<bool> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            func: Arc::new(func),
        }
    }

    /// Returns the sharing key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Evaluates the predicate. Errors from the callable propagate unchanged.
    ///
    /// # Errors
    /// Returns whatever the underlying callable returns.
    pub fn test(&self, args: &[Value]) -> Result<bool> {
        (self.func)(args)
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Predicate {}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<predicate {}>", self.key)
    }
}

/// A single predicate plus the variables it reads, in argument order.
#[derive(Clone, Debug, PartialEq)]
pub struct SingleConstraint {
    /// The predicate.
    pub predicate: Predicate,
    /// Variables passed to the predicate, in order.
    pub variables: Vec<Variable>,
}

impl SingleConstraint {
    /// Returns true if the constraint reads no variables.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.variables.is_empty()
    }
}

/// A pattern's constraint: a single predicate or a conjunction.
#[derive(Clone, Debug, PartialEq)]
pub enum Constraint {
    /// One predicate.
    Single(SingleConstraint),
    /// All children must hold.
    And(Vec<Constraint>),
}

impl Constraint {
    /// The empty conjunction (always holds).
    #[must_use]
    pub fn none() -> Self {
        Self::And(Vec::new())
    }

    /// Creates a single constraint.
    #[must_use]
    pub fn single(predicate: Predicate, variables: Vec<Variable>) -> Self {
        Self::Single(SingleConstraint {
            predicate,
            variables,
        })
    }

    /// Conjoins `other` onto this constraint, flattening nested `And`s
    /// at the top level.
    #[must_use]
    pub fn and(self, other: Constraint) -> Self {
        match self {
            Self::And(mut children) => {
                children.push(other);
                Self::And(children)
            }
            single @ Self::Single(_) => Self::And(vec![single, other]),
        }
    }

    /// Returns every single constraint in declaration order, descending
    /// through nested conjunctions.
    #[must_use]
    pub fn singles(&self) -> Vec<&SingleConstraint> {
        let mut out = Vec::new();
        self.collect_singles(&mut out);
        out
    }

    fn collect_singles<'a>(&'a self, out: &mut Vec<&'a SingleConstraint>) {
        match self {
            Self::Single(single) => out.push(single),
            Self::And(children) => {
                for child in children {
                    child.collect_singles(out);
                }
            }
        }
    }
}
