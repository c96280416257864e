//! Layered Topological Sort
//!
//! Groups nodes by their distance from the sinks of the dependency relation.
//!
//! # Algorithm
//!
//! 1. Layer 0 holds every node with no outgoing edges. Nodes pointing at a key
//!    that is not in the graph are detached straight away.
//! 2. Each round, the candidates are the predecessors of the last layer. A
//!    candidate is carried over with a count of its targets not yet placed;
//!    placing a target counts it down. A candidate joins the new layer when
//!    its count reaches zero.
//! 3. When a round produces an empty layer, every node that was never placed
//!    can never be satisfied: somewhere down its dependency chain is a
//!    detached node or a missing key. Those nodes are detached too.
//!
//! Only predecessors of the layer just placed are touched each round, so a
//! sort costs O(V + E) regardless of depth.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};
use tracing::trace;

use super::edges::EdgeIndex;

/// Result of [`Dag::topological_sort`](super::Dag::topological_sort).
///
/// A node in layer `i` has a longest dependency chain of length `i` down to a
/// sink; every target of a node in layer `i > 0` lies in a lower layer.
/// A node is detached when it depends, directly or transitively, on a key
/// that is not in the graph. Every node is either in exactly one layer or
/// detached.
///
/// Order within a layer follows insertion order but is not part of the
/// contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layering<K> {
    /// Layers from the sinks upward.
    pub layers: Vec<Vec<K>>,

    /// Nodes that can never have all of their dependencies satisfied.
    pub detached: Vec<K>,
}

impl<K> Layering<K> {
    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Check whether there are no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Iterate layers from the sinks upward.
    pub fn iter(&self) -> impl Iterator<Item = &[K]> + '_ {
        self.layers.iter().map(Vec::as_slice)
    }

    /// The layer `key` was placed in, or `None` if it is detached or unknown.
    ///
    /// Scans the layers on every call. Use [`depths`](Self::depths) when
    /// looking up many keys.
    pub fn depth_of(&self, key: &K) -> Option<usize>
    where
        K: PartialEq,
    {
        self.layers.iter().position(|layer| layer.contains(key))
    }

    /// Map every layered key to its layer.
    pub fn depths(&self) -> HashMap<&K, usize>
    where
        K: Eq + Hash,
    {
        self.layers
            .iter()
            .enumerate()
            .flat_map(|(depth, layer)| layer.iter().map(move |key| (key, depth)))
            .collect()
    }

    /// Check whether `key` was classified as detached.
    ///
    /// Scans the detached list on every call.
    pub fn is_detached(&self, key: &K) -> bool
    where
        K: PartialEq,
    {
        self.detached.contains(key)
    }
}

impl<K> Default for Layering<K> {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            detached: Vec::new(),
        }
    }
}

pub(super) fn layer<K, D>(
    nodes: &IndexMap<K, D>,
    outgoing: &EdgeIndex<K>,
    incoming: &EdgeIndex<K>,
) -> Layering<K>
where
    K: Eq + Hash + Clone,
{
    let mut seed: Vec<&K> = Vec::new();
    let mut detached: IndexSet<&K> = IndexSet::new();

    for key in nodes.keys() {
        let mut targets = outgoing.adjacent(key).peekable();
        if targets.peek().is_none() {
            seed.push(key);
        } else if targets.any(|target| !nodes.contains_key(target)) {
            detached.insert(key);
        }
    }

    let mut satisfied: HashSet<&K> = seed.iter().copied().collect();
    let mut unsatisfied: HashMap<&K, usize> = HashMap::new();
    let mut layers: Vec<Vec<&K>> = vec![seed];

    while let Some(previous) = layers.last().filter(|layer| !layer.is_empty()) {
        let mut next = Vec::new();
        for placed in previous {
            for candidate in incoming.adjacent(placed) {
                if !nodes.contains_key(candidate) || detached.contains(candidate) {
                    continue;
                }
                let pending = unsatisfied
                    .entry(candidate)
                    .or_insert_with(|| outgoing.adjacent(candidate).count());
                *pending -= 1;
                if *pending == 0 {
                    unsatisfied.remove(candidate);
                    next.push(candidate);
                }
            }
        }

        trace!(
            depth = layers.len(),
            placed = next.len(),
            carried = unsatisfied.len(),
            "layer built"
        );
        satisfied.extend(next.iter().copied());
        layers.push(next);
    }

    if layers.last().is_some_and(Vec::is_empty) {
        layers.pop();
    }

    let stranded: Vec<&K> = nodes
        .keys()
        .filter(|key| !satisfied.contains(*key) && !detached.contains(*key))
        .collect();
    detached.extend(stranded);

    Layering {
        layers: layers
            .into_iter()
            .map(|layer| layer.into_iter().cloned().collect())
            .collect(),
        detached: detached.into_iter().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::Dag;

    #[test]
    fn diamond_sorts_into_single_node_layers() {
        let mut dag = Dag::new();
        dag.add_node(1, (), [2, 3, 4]).unwrap();
        dag.add_node(2, (), [4]).unwrap();
        dag.add_node(3, (), [2, 4]).unwrap();
        dag.add_node(4, (), []).unwrap();

        let sorted = dag.topological_sort();
        assert_eq!(sorted.layers, vec![vec![4], vec![2], vec![3], vec![1]]);
        assert!(sorted.detached.is_empty());
    }

    #[test]
    fn independent_nodes_share_one_layer() {
        let mut dag = Dag::new();
        for key in 1..=4 {
            dag.add_node(key, (), []).unwrap();
        }

        let sorted = dag.topological_sort();
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted.layers[0].len(), 4);
        assert!(sorted.detached.is_empty());
    }

    #[test]
    fn missing_targets_detach_dependents() {
        let mut dag = Dag::new();
        dag.add_node(1, (), []).unwrap();
        dag.add_node(2, (), [1]).unwrap();
        dag.add_node(3, (), [2]).unwrap();
        dag.add_node(4, (), [10]).unwrap();
        dag.add_node(5, (), [3, 4]).unwrap();

        let sorted = dag.topological_sort();
        assert_eq!(sorted.layers, vec![vec![1], vec![2], vec![3]]);
        assert_eq!(sorted.detached, vec![4, 5]);
    }

    #[test]
    fn all_nodes_detached_yields_no_layers() {
        let mut dag = Dag::new();
        for key in 1..=4 {
            dag.add_node(key, (), [key + 100]).unwrap();
        }

        let sorted = dag.topological_sort();
        assert!(sorted.is_empty());
        assert_eq!(sorted.detached, vec![1, 2, 3, 4]);
    }

    #[test]
    fn detachment_propagates_without_any_sink() {
        let mut dag = Dag::new();
        dag.add_node("a", (), ["missing"]).unwrap();
        dag.add_node("b", (), ["a"]).unwrap();
        dag.add_node("c", (), ["b"]).unwrap();

        let sorted = dag.topological_sort();
        assert!(sorted.is_empty());
        assert_eq!(sorted.detached, vec!["a", "b", "c"]);
    }

    #[test]
    fn node_with_detached_and_placed_targets_is_reported_once() {
        let mut dag = Dag::new();
        dag.add_node(1, (), []).unwrap();
        dag.add_node(2, (), [1, 99]).unwrap();
        dag.add_node(3, (), [2]).unwrap();

        let sorted = dag.topological_sort();
        assert_eq!(sorted.layers, vec![vec![1]]);
        assert_eq!(sorted.detached, vec![2, 3]);
    }

    #[test]
    fn removed_node_detaches_its_dependents() {
        let mut dag = Dag::new();
        dag.add_node(1, (), []).unwrap();
        dag.add_node(2, (), [1]).unwrap();
        dag.add_node(3, (), [2]).unwrap();
        dag.remove_node(&1).unwrap();

        let sorted = dag.topological_sort();
        assert!(sorted.is_empty());
        assert_eq!(sorted.detached, vec![2, 3]);
    }

    #[test]
    fn layer_is_the_longest_chain_to_a_sink() {
        let mut dag = Dag::new();
        dag.add_node('a', (), []).unwrap();
        dag.add_node('b', (), ['a']).unwrap();
        dag.add_node('c', (), ['b']).unwrap();
        dag.add_node('d', (), ['a', 'c']).unwrap();

        let sorted = dag.topological_sort();
        assert_eq!(sorted.depth_of(&'a'), Some(0));
        assert_eq!(sorted.depth_of(&'d'), Some(3));
        assert_eq!(sorted.depth_of(&'z'), None);
        assert!(!sorted.is_detached(&'d'));
    }

    #[test]
    fn empty_graph_sorts_to_nothing() {
        let dag: Dag<u8, ()> = Dag::new();
        let sorted = dag.topological_sort();
        assert!(sorted.is_empty());
        assert!(sorted.detached.is_empty());
    }

    #[test]
    fn sorting_does_not_mutate() {
        let mut dag = Dag::new();
        dag.add_node(1, (), [2]).unwrap();
        dag.add_node(2, (), []).unwrap();

        let first = dag.topological_sort();
        let second = dag.topological_sort();
        assert_eq!(first, second);
        assert_eq!(first.iter().count(), 2);
    }

    #[test]
    fn depths_agree_with_depth_of() {
        let mut dag = Dag::new();
        dag.add_node(1, (), [2, 3]).unwrap();
        dag.add_node(2, (), [3]).unwrap();
        dag.add_node(3, (), []).unwrap();
        dag.add_node(4, (), [9]).unwrap();

        let sorted = dag.topological_sort();
        let depths = sorted.depths();
        assert_eq!(depths.len(), 3);
        for key in [1, 2, 3, 4] {
            assert_eq!(depths.get(&key).copied(), sorted.depth_of(&key));
        }
        assert!(sorted.is_detached(&4));
    }

    #[test]
    fn deep_chain_sorts_one_node_per_layer() {
        const DEPTH: u32 = 20_000;
        let mut dag = Dag::with_capacity(DEPTH as usize);
        dag.add_node(0, (), []).unwrap();
        for key in 1..DEPTH {
            dag.add_node(key, (), [key - 1]).unwrap();
        }

        let sorted = dag.topological_sort();
        assert_eq!(sorted.len(), DEPTH as usize);
        assert!(sorted.iter().enumerate().all(|(depth, layer)| layer == [depth as u32]));
        assert!(sorted.detached.is_empty());
    }

    #[test]
    fn deep_chain_over_a_missing_key_is_detached_whole() {
        const DEPTH: u32 = 20_000;
        let mut dag = Dag::with_capacity(DEPTH as usize);
        dag.add_node(0, (), [u32::MAX]).unwrap();
        dag.add_node(1, (), []).unwrap();
        for key in 2..DEPTH {
            dag.add_node(key, (), [key - 2, key - 1]).unwrap();
        }

        let sorted = dag.topological_sort();
        assert_eq!(sorted.layers, vec![vec![1]]);
        assert_eq!(sorted.detached.len(), DEPTH as usize - 1);
        assert_eq!(sorted.detached[..3], [0, 2, 3]);
    }
}
