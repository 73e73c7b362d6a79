//! The condition tree.

use std::sync::Arc;

use crate::pattern::Pattern;
use crate::variable::Variable;

/// A node of a rule's condition tree.
///
/// The set of variants is closed; the compiler matches exhaustively so a
/// new variant cannot be silently ignored.
#[derive(Clone, Debug)]
pub enum Condition {
    /// A single pattern.
    Pattern(Pattern),
    /// All children hold, bound left to right.
    And(Vec<Condition>),
    /// Any child holds. Not compiled.
    Or(Vec<Condition>),
    /// Nested navigation from a bound object. Reserved; not compiled.
    ObjectPath(ObjectPath),
}

impl Condition {
    /// Conjunction of `children`.
    #[must_use]
    pub fn and(children: impl IntoIterator<Item = Condition>) -> Self {
        Self::And(children.into_iter().collect())
    }

    /// Disjunction of `children`.
    #[must_use]
    pub fn or(children: impl IntoIterator<Item = Condition>) -> Self {
        Self::Or(children.into_iter().collect())
    }

    /// Short lowercase name used in error frames.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pattern(pattern) => pattern.kind().name(),
            Self::And(_) => "and",
            Self::Or(_) => "or",
            Self::ObjectPath(_) => "object-path",
        }
    }

    /// Returns every pattern in the tree, depth first.
    #[must_use]
    pub fn patterns(&self) -> Vec<&Pattern> {
        let mut out = Vec::new();
        self.collect_patterns(&mut out);
        out
    }

    fn collect_patterns<'a>(&'a self, out: &mut Vec<&'a Pattern>) {
        match self {
            Self::Pattern(pattern) => out.push(pattern),
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.collect_patterns(out);
                }
            }
            Self::ObjectPath(_) => {}
        }
    }
}

impl From<Pattern> for Condition {
    fn from(pattern: Pattern) -> Self {
        Self::Pattern(pattern)
    }
}

/// Navigation from a bound variable through a chain of fields.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectPath {
    /// The variable navigation starts from.
    pub root: Variable,
    /// Field names, outermost first.
    pub path: Vec<Arc<str>>,
    /// The variable bound to the object at the end of the path.
    pub target: Variable,
}
