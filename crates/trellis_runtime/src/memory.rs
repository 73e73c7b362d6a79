//! Working memory: the objects inserted into each source.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use trellis_foundation::Value;

/// Identifies one inserted object for retraction and refraction.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactHandle(u64);

impl FactHandle {
    /// Returns the raw handle number.
    #[must_use]
    pub const fn index(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for FactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FactHandle({})", self.0)
    }
}

impl fmt::Display for FactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// Objects held by one source, in insertion order.
pub type SourceMemory = Vec<(FactHandle, Value)>;

/// Objects per entry point and per stream.
#[derive(Clone, Debug, Default)]
pub struct WorkingMemory {
    entry_points: BTreeMap<Arc<str>, SourceMemory>,
    streams: BTreeMap<Arc<str>, SourceMemory>,
    next_handle: u64,
}

impl WorkingMemory {
    /// Creates empty working memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts into a polled entry point.
    pub fn insert(&mut self, entry_point: &str, value: Value) -> FactHandle {
        let handle = self.allocate();
        self.entry_points
            .entry(Arc::from(entry_point))
            .or_default()
            .push((handle, value));
        handle
    }

    /// Emits onto a reactive stream.
    pub fn emit(&mut self, stream: &str, value: Value) -> FactHandle {
        let handle = self.allocate();
        self.streams
            .entry(Arc::from(stream))
            .or_default()
            .push((handle, value));
        handle
    }

    /// Removes an object from whichever source holds it.
    ///
    /// Returns the removed value, or `None` if the handle is unknown.
    pub fn retract(&mut self, handle: FactHandle) -> Option<Value> {
        for memory in self.entry_points.values_mut().chain(self.streams.values_mut()) {
            if let Some(pos) = memory.iter().position(|(h, _)| *h == handle) {
                return Some(memory.remove(pos).1);
            }
        }
        None
    }

    /// Objects of an entry point.
    #[must_use]
    pub fn entry_point(&self, name: &str) -> &[(FactHandle, Value)] {
        self.entry_points.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Objects of a stream.
    #[must_use]
    pub fn stream(&self, name: &str) -> &[(FactHandle, Value)] {
        self.streams.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total number of objects held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entry_points
            .values()
            .chain(self.streams.values())
            .map(Vec::len)
            .sum()
    }

    /// Returns true if no object is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn allocate(&mut self) -> FactHandle {
        let handle = FactHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }
}
