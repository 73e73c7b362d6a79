//! Persistent collections backing [`Value::Vec`](crate::Value::Vec) and fact
//! records.
//!
//! Both wrap `im` structures so that cloning a value into a partial-match
//! tuple never copies its contents.

use std::borrow::Borrow;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

// =============================================================================
// Seq
// =============================================================================

/// Ordered persistent sequence, the payload of iterable values.
#[derive(Clone, Default)]
pub struct Seq<T: Clone>(im::Vector<T>);

impl<T: Clone> Seq<T> {
    /// Creates an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self(im::Vector::new())
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the sequence has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Element at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.0.get(index)
    }

    /// First element, if any.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.0.front()
    }

    /// Returns a new sequence with `value` appended. `self` is untouched.
    #[must_use]
    pub fn push_back(&self, value: T) -> Self {
        let mut next = self.0.clone();
        next.push_back(value);
        Self(next)
    }

    /// Iterates in order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Seq<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Clone + PartialEq> PartialEq for Seq<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: Clone + Eq> Eq for Seq<T> {}

impl<T: Clone + Hash> Hash for Seq<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for item in self.iter() {
            item.hash(state);
        }
    }
}

impl<T: Clone> FromIterator<T> for Seq<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a, T: Clone> IntoIterator for &'a Seq<T> {
    type Item = &'a T;
    type IntoIter = im::vector::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// FieldMap
// =============================================================================

/// Persistent hash map holding the fields of a fact.
#[derive(Clone, Default)]
pub struct FieldMap<K, V>(im::HashMap<K, V>)
where
    K: Clone + Eq + Hash,
    V: Clone;

impl<K: Clone + Eq + Hash, V: Clone> FieldMap<K, V> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self(im::HashMap::new())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Looks up by any borrowed form of the key.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.0.get(key)
    }

    /// Returns a new map with `key` bound to `value`. `self` is untouched.
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        let mut next = self.0.clone();
        next.insert(key, value);
        Self(next)
    }

    /// Iterates keys in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.0.keys()
    }

    /// Iterates entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.0.iter()
    }
}

impl<K, V> fmt::Debug for FieldMap<K, V>
where
    K: Clone + Eq + Hash + fmt::Debug,
    V: Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Clone + Eq + Hash, V: Clone + PartialEq> PartialEq for FieldMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<K: Clone + Eq + Hash, V: Clone + Eq> Eq for FieldMap<K, V> {}

impl<K: Clone + Eq + Hash, V: Clone + Hash> Hash for FieldMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Entries are summed so the hash ignores iteration order.
        let mut combined: u64 = 0;
        for (k, v) in self.iter() {
            let mut entry = DefaultHasher::new();
            k.hash(&mut entry);
            v.hash(&mut entry);
            combined = combined.wrapping_add(entry.finish());
        }
        self.len().hash(state);
        combined.hash(state);
    }
}
