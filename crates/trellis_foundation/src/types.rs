//! Runtime type descriptors for object-type narrowing.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Runtime type of a value flowing through the network.
///
/// Object-type nodes narrow an entry point's stream to the values whose
/// runtime type is accepted by the node's `ObjectType`.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObjectType {
    /// The sentinel type of the implicit initial fact.
    InitialFact,
    /// The nil type (only value: nil).
    Nil,
    /// Boolean type.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Float,
    /// String type.
    String,
    /// Vector of values.
    Vec,
    /// Named fact type, e.g. `Person`.
    Fact(Arc<str>),
    /// Any type (accepts any value except the initial fact).
    Any,
}

impl ObjectType {
    /// Creates a named fact type.
    #[must_use]
    pub fn fact(name: impl Into<Arc<str>>) -> Self {
        Self::Fact(name.into())
    }

    /// Returns true if this type is `Any`.
    #[must_use]
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Returns true if this is the initial-fact sentinel.
    #[must_use]
    pub const fn is_initial_fact(&self) -> bool {
        matches!(self, Self::InitialFact)
    }

    /// Returns the fact type name, if this is a named fact type.
    #[must_use]
    pub fn fact_name(&self) -> Option<&str> {
        match self {
            Self::Fact(name) => Some(name),
            _ => None,
        }
    }

    /// Checks if a value of type `actual` passes a node narrowing to `self`.
    ///
    /// There is no numeric promotion: an `Int` stream and a `Float` stream
    /// are distinct partitions. `Any` never admits the initial fact so
    /// that catch-all patterns do not observe the sentinel.
    #[must_use]
    pub fn accepts(&self, actual: &ObjectType) -> bool {
        match (self, actual) {
            (Self::Any, Self::InitialFact) => false,
            (Self::Any, _) => true,
            (expected, actual) => expected == actual,
        }
    }
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitialFact => write!(f, "initial-fact"),
            Self::Nil => write!(f, "nil"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "string"),
            Self::Vec => write!(f, "vec"),
            Self::Fact(name) => write!(f, "{name}"),
            Self::Any => write!(f, "any"),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
