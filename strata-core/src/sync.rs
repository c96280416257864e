//! Shared Access
//!
//! [`Dag`] is not synchronized. [`SharedDag`] puts it behind a read-write lock
//! for callers that need to mutate it from more than one thread, and hands out
//! independent snapshots for readers that should not hold the lock.

use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Result;
use crate::graph::{Dag, Layering};

/// A cheaply clonable handle to a lock-protected [`Dag`].
///
/// # Example
///
/// ```rust
/// use strata_core::SharedDag;
///
/// let shared = SharedDag::new();
/// shared.add_node("compile", (), ["fetch"]).unwrap();
///
/// let snapshot = shared.snapshot();
/// shared.add_node("fetch", (), []).unwrap();
///
/// assert_eq!(snapshot.len(), 1);
/// assert_eq!(shared.read().len(), 2);
/// ```
pub struct SharedDag<K, D> {
    inner: Arc<RwLock<Dag<K, D>>>,
}

impl<K, D> SharedDag<K, D>
where
    K: Eq + Hash + Clone,
{
    /// Create a handle to an empty graph.
    pub fn new() -> Self {
        Self::from_dag(Dag::new())
    }

    /// Wrap an existing graph.
    pub fn from_dag(dag: Dag<K, D>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(dag)),
        }
    }

    /// Lock the graph for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, Dag<K, D>> {
        self.inner.read()
    }

    /// Lock the graph for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, Dag<K, D>> {
        self.inner.write()
    }

    /// See [`Dag::add_node`].
    pub fn add_node<I>(&self, key: K, data: D, outgoing: I) -> Result<(), K>
    where
        I: IntoIterator<Item = K>,
    {
        self.inner.write().add_node(key, data, outgoing)
    }

    /// See [`Dag::remove_node`].
    pub fn remove_node(&self, key: &K) -> Result<D, K> {
        self.inner.write().remove_node(key)
    }

    /// See [`Dag::trim`].
    pub fn trim<I>(&self, roots: I) -> Vec<K>
    where
        I: IntoIterator<Item = K>,
    {
        self.inner.write().trim(roots)
    }

    /// See [`Dag::topological_sort`].
    pub fn topological_sort(&self) -> Layering<K> {
        self.inner.read().topological_sort()
    }

    /// Clone the graph out from under the lock.
    pub fn snapshot(&self) -> Dag<K, D>
    where
        D: Clone,
    {
        self.inner.read().clone()
    }
}

impl<K, D> Clone for SharedDag<K, D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, D> Default for SharedDag<K, D>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, D> From<Dag<K, D>> for SharedDag<K, D>
where
    K: Eq + Hash + Clone,
{
    fn from(dag: Dag<K, D>) -> Self {
        Self::from_dag(dag)
    }
}
