//! Typed fact records.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::collections::FieldMap;
use crate::error::Error;
use crate::types::ObjectType;
use crate::value::Value;

/// A typed record inserted into an entry point.
///
/// Facts are immutable; `with` returns a new fact sharing structure with
/// the original.
#[derive(Clone)]
pub struct Fact {
    object_type: ObjectType,
    fields: FieldMap<Arc<str>, Value>,
}

impl Fact {
    /// Creates an empty fact of the named type.
    #[must_use]
    pub fn new(type_name: impl Into<Arc<str>>) -> Self {
        Self {
            object_type: ObjectType::Fact(type_name.into()),
            fields: FieldMap::new(),
        }
    }

    /// The implicit initial fact every session starts with.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            object_type: ObjectType::InitialFact,
            fields: FieldMap::new(),
        }
    }

    /// Returns a copy of this fact with `field` set to `value`.
    #[must_use]
    pub fn with(&self, field: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        Self {
            object_type: self.object_type.clone(),
            fields: self.fields.insert(field.into(), value.into()),
        }
    }

    /// Returns the runtime type of this fact.
    #[must_use]
    pub fn object_type(&self) -> &ObjectType {
        &self.object_type
    }

    /// Gets a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Gets a field value, failing if the field is absent.
    ///
    /// # Errors
    /// Returns an evaluator failure naming the missing field.
    pub fn field(&self, field: &str) -> crate::Result<&Value> {
        self.get(field).ok_or_else(|| {
            Error::evaluator(
                format!("{}.{field}", self.object_type),
                "no such field",
            )
        })
    }

    /// Returns the field names in sorted order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(AsRef::as_ref).collect();
        names.sort_unstable();
        names
    }
}

impl PartialEq for Fact {
    fn eq(&self, other: &Self) -> bool {
        self.object_type == other.object_type && self.fields == other.fields
    }
}

impl Eq for Fact {}

impl Hash for Fact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.object_type.hash(state);
        self.fields.hash(state);
    }
}

impl fmt::Debug for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.object_type)?;
        for (i, name) in self.field_names().into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if let Some(value) = self.get(name) {
                write!(f, "{name}: {value}")?;
            }
        }
        write!(f, "}}")
    }
}
