//! Strata Core
//!
//! This crate provides an in-memory directed acyclic graph for dependency
//! resolution and staged execution. It implements:
//!
//! - Incremental node insertion with cycle rejection at insertion time
//! - Reachability queries
//! - Pruning of everything unreachable from a set of roots
//! - A layered topological sort that groups nodes by dependency depth and
//!   reports nodes whose dependencies can never be satisfied
//!
//! # Architecture
//!
//! The crate is organized into a few modules:
//!
//! - `graph`: The graph itself, its edge indexes and the layered sort
//! - `error`: Error types and machine-readable error codes
//! - `sync`: A lock-protected handle for sharing a graph across threads
//!
//! # Example
//!
//! ```rust
//! use strata_core::graph::Dag;
//!
//! let mut dag = Dag::new();
//! dag.add_node("link", "cc -o app", ["compile"]).unwrap();
//! dag.add_node("compile", "cc -c main.c", ["fetch"]).unwrap();
//!
//! // `fetch` depending on `link` would close a cycle
//! assert!(dag.add_node("fetch", "git pull", ["link"]).is_err());
//! dag.add_node("fetch", "git pull", []).unwrap();
//!
//! let sorted = dag.topological_sort();
//! assert_eq!(sorted.layers, vec![vec!["fetch"], vec!["compile"], vec!["link"]]);
//! assert!(sorted.detached.is_empty());
//! ```

pub mod error;
pub mod graph;
pub mod sync;

pub use error::{DagError, ErrorCode, Result};
pub use graph::{Dag, Layering};
pub use sync::SharedDag;
