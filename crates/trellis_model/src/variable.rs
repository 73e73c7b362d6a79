//! Pattern variables.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use trellis_foundation::ObjectType;

static NEXT_VAR_ID: AtomicU32 = AtomicU32::new(0);

/// Process-unique variable identifier.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct VarId(u32);

impl VarId {
    /// Returns the raw index of this variable.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VarId({})", self.0)
    }
}

/// A variable bound by a pattern and read by constraints.
///
/// Identity is the [`VarId`]; two variables with the same name and type
/// are still distinct bindings.
#[derive(Clone)]
pub struct Variable {
    id: VarId,
    name: Arc<str>,
    object_type: ObjectType,
}

impl Variable {
    /// Declares a new variable of the given runtime type.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, object_type: ObjectType) -> Self {
        Self {
            id: VarId(NEXT_VAR_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            object_type,
        }
    }

    /// Returns the variable's identifier.
    #[must_use]
    pub fn id(&self) -> VarId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared runtime type.
    #[must_use]
    pub fn object_type(&self) -> &ObjectType {
        &self.object_type
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}#{}: {}", self.name, self.id.0, self.object_type)
    }
}
