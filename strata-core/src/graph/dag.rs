//! Directed Acyclic Graph
//!
//! [`Dag`] owns the node store and both edge indexes. Every mutation keeps
//! the three in step; every query only reads them.
//!
//! # Cycle Prevention
//!
//! Cycles are rejected when a node is inserted, never repaired later. A node's
//! outgoing edges are fixed at insertion, so the only way a new node can close
//! a cycle is if some existing node already points at its key (a forward
//! reference) and one of the new node's targets can reach that node:
//!
//! ```text
//! end -> key -> start -> ... -> end
//! ```
//!
//! Checking every `(start, end)` pair with a breadth-first search is enough to
//! keep the outgoing relation acyclic.

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;
use std::ops::Index;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use super::edges::EdgeIndex;
use super::layers::{self, Layering};
use crate::error::{DagError, ErrorCode, Result};

/// An incrementally built directed acyclic graph.
///
/// An edge `from -> to` means `from` depends on `to`. Keys must be unique.
/// Data is stored but never inspected.
///
/// Cloning produces an independent structural snapshot. Store `Arc<T>` as the
/// data type to have the snapshot share payloads with the original.
#[derive(Debug, Clone)]
pub struct Dag<K, D> {
    /// Inserted nodes, in insertion order.
    nodes: IndexMap<K, D>,

    /// What each node depends on. One entry per inserted node.
    outgoing: EdgeIndex<K>,

    /// What depends on each key, including keys not inserted yet.
    incoming: EdgeIndex<K>,
}

impl<K, D> Dag<K, D>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            outgoing: EdgeIndex::new(),
            incoming: EdgeIndex::new(),
        }
    }

    /// Create an empty graph with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: IndexMap::with_capacity(capacity),
            outgoing: EdgeIndex::with_capacity(capacity),
            incoming: EdgeIndex::with_capacity(capacity),
        }
    }

    /// Insert a node with the keys it depends on.
    ///
    /// Targets do not have to exist yet. Duplicate targets are collapsed.
    ///
    /// # Errors
    ///
    /// - [`DagError::DuplicateKey`] if `key` is already a node.
    /// - [`DagError::CycleDetected`] if the new edges would close a cycle.
    ///
    /// The graph is unchanged when an error is returned.
    pub fn add_node<I>(&mut self, key: K, data: D, outgoing: I) -> Result<(), K>
    where
        I: IntoIterator<Item = K>,
    {
        if self.nodes.contains_key(&key) {
            let code = ErrorCode::DuplicateKey;
            debug!(%code, reason = code.message(), "insertion rejected");
            return Err(DagError::DuplicateKey(key));
        }

        let targets: IndexSet<K> = outgoing.into_iter().collect();
        if let Some(through) = self.find_cycle(&key, &targets) {
            let through = through.clone();
            let code = ErrorCode::CycleDetected;
            debug!(%code, reason = code.message(), "insertion rejected");
            return Err(DagError::CycleDetected { key, through });
        }

        for target in &targets {
            self.incoming.link(target.clone(), key.clone());
        }
        let degree = targets.len();
        self.outgoing.insert(key.clone(), targets);
        self.nodes.insert(key, data);

        debug!(nodes = self.nodes.len(), outgoing = degree, "node inserted");
        Ok(())
    }

    /// Remove a node and return its data.
    ///
    /// The node is dropped from the incoming sets of everything it pointed
    /// at. Nodes that point at it keep doing so; they are classified as
    /// detached by the next [`topological_sort`](Self::topological_sort).
    ///
    /// # Errors
    ///
    /// [`DagError::UnknownKey`] if no node has this key.
    pub fn remove_node(&mut self, key: &K) -> Result<D, K> {
        self.take(key)
            .ok_or_else(|| DagError::UnknownKey(key.clone()))
    }

    fn take(&mut self, key: &K) -> Option<D> {
        let data = self.nodes.shift_remove(key)?;
        for target in self.outgoing.remove(key).into_iter().flatten() {
            self.incoming.unlink(&target, key);
        }
        debug!(nodes = self.nodes.len(), "node removed");
        Some(data)
    }

    /// Remove every node not reachable from `roots` along outgoing edges.
    ///
    /// Roots that are not nodes are skipped. Returns the removed keys in
    /// node store order.
    pub fn trim<I>(&mut self, roots: I) -> Vec<K>
    where
        I: IntoIterator<Item = K>,
    {
        let mut reachable: HashSet<K> = HashSet::new();
        let mut queue: VecDeque<K> = VecDeque::new();

        for root in roots {
            if reachable.insert(root.clone()) {
                queue.push_back(root);
            }
        }

        while let Some(key) = queue.pop_front() {
            for target in self.outgoing.adjacent(&key) {
                if reachable.insert(target.clone()) {
                    queue.push_back(target.clone());
                }
            }
        }

        let unreachable: Vec<K> = self
            .nodes
            .keys()
            .filter(|key| !reachable.contains(*key))
            .cloned()
            .collect();

        for key in &unreachable {
            self.take(key);
        }

        debug!(
            removed = unreachable.len(),
            nodes = self.nodes.len(),
            "graph trimmed"
        );
        unreachable
    }

    /// [`trim`](Self::trim) for callers whose root set may be absent.
    ///
    /// # Errors
    ///
    /// [`DagError::InvalidArgument`] if `roots` is `None`.
    pub fn try_trim<I>(&mut self, roots: Option<I>) -> Result<Vec<K>, K>
    where
        I: IntoIterator<Item = K>,
    {
        let roots = roots.ok_or(DagError::InvalidArgument("trim requires a root set"))?;
        Ok(self.trim(roots))
    }

    /// Check whether inserting `key` with these outgoing edges would close a
    /// cycle. Does not modify the graph.
    pub fn causes_cycle<'a, I>(&self, key: &K, outgoing: I) -> bool
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        let targets: IndexSet<K> = outgoing.into_iter().cloned().collect();
        self.find_cycle(key, &targets).is_some()
    }

    /// Find the outgoing target through which inserting `key` would loop back.
    fn find_cycle<'a>(&self, key: &'a K, targets: &'a IndexSet<K>) -> Option<&'a K> {
        if targets.contains(key) {
            return Some(key);
        }

        let predecessors = self.incoming.get(key)?;
        for start in targets {
            for end in predecessors {
                if self.path_exists(start, end) {
                    trace!("new edges would reach an existing predecessor");
                    return Some(start);
                }
            }
        }
        None
    }

    /// Check whether `end` can be reached from `start` along outgoing edges.
    ///
    /// A key always reaches itself, whether or not it is a node.
    pub fn path_exists(&self, start: &K, end: &K) -> bool {
        let mut visited: HashSet<&K> = HashSet::new();
        let mut queue: VecDeque<&K> = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(key) = queue.pop_front() {
            if key == end {
                trace!(visited = visited.len(), "path found");
                return true;
            }
            for target in self.outgoing.adjacent(key) {
                if visited.insert(target) {
                    queue.push_back(target);
                }
            }
        }

        trace!(visited = visited.len(), "no path");
        false
    }

    /// Group the graph into dependency layers, sinks first.
    ///
    /// See [`Layering`] for the meaning of layers and detached nodes.
    pub fn topological_sort(&self) -> Layering<K> {
        let layering = layers::layer(&self.nodes, &self.outgoing, &self.incoming);
        debug!(
            layers = layering.layers.len(),
            detached = layering.detached.len(),
            "graph sorted"
        );
        layering
    }

    /// Keys that point at `key`. Empty when nothing does, including for keys
    /// that were never inserted.
    pub fn incoming(&self, key: &K) -> impl Iterator<Item = &K> + '_ {
        self.incoming.adjacent(key)
    }

    /// Keys a node depends on, or `None` if `key` is not a node.
    pub fn outgoing(&self, key: &K) -> Option<&IndexSet<K>> {
        self.outgoing.get(key)
    }

    /// Nodes with no dependencies at all.
    pub fn ready(&self) -> impl Iterator<Item = &K> + '_ {
        self.nodes
            .keys()
            .filter(|key| self.outgoing.adjacent(key).next().is_none())
    }

    /// Get the data stored for `key`.
    pub fn get(&self, key: &K) -> Option<&D> {
        self.nodes.get(key)
    }

    /// Get a mutable reference to the data stored for `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut D> {
        self.nodes.get_mut(key)
    }

    /// Get the data stored for `key`.
    ///
    /// # Errors
    ///
    /// [`DagError::UnknownKey`] if no node has this key.
    pub fn try_get(&self, key: &K) -> Result<&D, K> {
        self.nodes
            .get(key)
            .ok_or_else(|| DagError::UnknownKey(key.clone()))
    }

    /// Check whether `key` is an inserted node.
    pub fn contains(&self, key: &K) -> bool {
        self.nodes.contains_key(key)
    }

    /// Iterate node keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.nodes.keys()
    }

    /// Iterate `(key, data)` pairs in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, K, D> {
        self.nodes.iter()
    }

    /// Number of inserted nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<K, D> Default for Dag<K, D>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, D> Index<&K> for Dag<K, D>
where
    K: Eq + Hash + Clone,
{
    type Output = D;

    /// # Panics
    ///
    /// Panics if `key` is not a node. Use [`Dag::try_get`] to get an error
    /// instead.
    fn index(&self, key: &K) -> &D {
        &self.nodes[key]
    }
}

impl<'a, K, D> IntoIterator for &'a Dag<K, D>
where
    K: Eq + Hash + Clone,
{
    type Item = (&'a K, &'a D);
    type IntoIter = indexmap::map::Iter<'a, K, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
