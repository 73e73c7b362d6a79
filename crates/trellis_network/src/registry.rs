//! Root registries and node id allocation.

use std::collections::BTreeMap;
use std::sync::Arc;

use trellis_foundation::{Error, Result, SemanticLimit};

use crate::node::NodeId;

/// Maps a source name to its shared root node.
///
/// Two instances exist per network: one for polled entry points and one
/// for reactive streams, so an entry point and a stream may share a name.
#[derive(Clone, Debug, Default)]
pub struct RootRegistry {
    roots: BTreeMap<Arc<str>, NodeId>,
}

impl RootRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the root registered for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.roots.get(name).copied()
    }

    /// Registers `root` for `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<Arc<str>>, root: NodeId) {
        self.roots.insert(name.into(), root);
    }

    /// Forgets every entry pointing at one of `removed`.
    pub fn prune(&mut self, removed: &[NodeId]) {
        self.roots.retain(|_, id| !removed.contains(id));
    }

    /// Returns the number of registered roots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Iterates `(name, root)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.roots.iter().map(|(name, id)| (name.as_ref(), *id))
    }
}

/// Monotonic node id allocator.
///
/// Ids are never reused, including ids handed out for nodes that turned
/// out to be shared or were rolled back.
#[derive(Clone, Debug, Default)]
pub struct IdGenerator {
    next: u32,
}

impl IdGenerator {
    /// Creates an allocator starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next id.
    ///
    /// # Errors
    /// Fails once the id space is exhausted.
    pub fn next_id(&mut self) -> Result<NodeId> {
        let next = self.next.checked_add(1).ok_or_else(|| {
            Error::limit_exceeded(SemanticLimit::MaxNodes { limit: u32::MAX })
        })?;
        let id = NodeId::new(self.next);
        self.next = next;
        Ok(id)
    }

    /// Returns one past the largest id handed out. Runtimes size per-node
    /// memory arrays with it.
    #[must_use]
    pub fn high_water_mark(&self) -> u32 {
        self.next
    }
}
