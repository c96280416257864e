//! Edge Index
//!
//! One direction of the graph's adjacency: a mapping from a key to the set of
//! keys on the other end of its edges. The graph keeps two of these, one for
//! dependencies and one for dependents.
//!
//! An entry in an index says nothing about whether the key is an inserted
//! node. The incoming index in particular holds entries for keys that are
//! only referenced so far.

use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

/// Mapping from a key to an ordered set of adjacent keys.
#[derive(Debug, Clone)]
pub(crate) struct EdgeIndex<K> {
    edges: IndexMap<K, IndexSet<K>>,
}

impl<K> EdgeIndex<K>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            edges: IndexMap::new(),
        }
    }

    /// Create an empty index with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            edges: IndexMap::with_capacity(capacity),
        }
    }

    /// Record the full adjacency set of `key`, replacing any previous one.
    pub fn insert(&mut self, key: K, adjacent: IndexSet<K>) {
        self.edges.insert(key, adjacent);
    }

    /// Add a single edge `from -> to`, creating the entry for `from` if needed.
    pub fn link(&mut self, from: K, to: K) {
        self.edges.entry(from).or_default().insert(to);
    }

    /// Remove the edge `from -> to`.
    ///
    /// An entry whose set becomes empty is dropped. Returns whether the edge
    /// was present.
    pub fn unlink(&mut self, from: &K, to: &K) -> bool {
        let Some(adjacent) = self.edges.get_mut(from) else {
            return false;
        };
        let removed = adjacent.shift_remove(to);
        if adjacent.is_empty() {
            self.edges.shift_remove(from);
        }
        removed
    }

    /// Remove the entry for `key`, returning its adjacency set.
    pub fn remove(&mut self, key: &K) -> Option<IndexSet<K>> {
        self.edges.shift_remove(key)
    }

    /// Get the adjacency set of `key`, if an entry exists.
    pub fn get(&self, key: &K) -> Option<&IndexSet<K>> {
        self.edges.get(key)
    }

    /// Iterate the keys adjacent to `key`. Empty when there is no entry.
    pub fn adjacent(&self, key: &K) -> impl Iterator<Item = &K> + '_ {
        self.edges.get(key).into_iter().flatten()
    }
}
