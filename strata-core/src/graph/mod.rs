//! Dependency Graph
//!
//! This module implements the incremental directed acyclic graph at the heart
//! of the crate.
//!
//! # Overview
//!
//! The graph is a DAG where:
//!
//! - Nodes are `(key, data)` pairs with unique keys
//! - An edge `A -> B` means A depends on B, so B has to be handled first
//!
//! Edges are fixed when a node is inserted, and an insertion that would close
//! a cycle is rejected before anything changes. Edges may point at keys that
//! are not in the graph yet.
//!
//! # Design Decisions
//!
//! 1. Edges are stored by key, never as references between nodes, so there is
//!    no shared ownership inside the graph.
//!
//! 2. We maintain both forward (dependencies) and reverse (dependents) edge
//!    indexes so traversal is cheap in both directions. The reverse index also
//!    holds entries for keys that are only referenced so far; that is what
//!    lets a later insertion of such a key detect a cycle.
//!
//! 3. All indexes preserve insertion order, which keeps iteration and layer
//!    contents deterministic.

mod dag;
mod edges;
mod layers;

pub use dag::Dag;
pub use layers::Layering;
