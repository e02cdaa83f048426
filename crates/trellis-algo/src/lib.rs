// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! trellis-algo: classical graph algorithms over a trellis store.
//!
//! All algorithms are stateless functions reading through a
//! [`trellis_core::StoreView`]; none mutate the store. They share one
//! weight-extraction contract ([`edge_weight`]) and one indexed
//! edge-iteration path, so weighted and unweighted variants agree on which
//! edges exist. The [`traverse`] dispatcher adds overlay authorization and
//! a panic boundary.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod bfs;
mod components;
mod dijkstra;
mod dsu;
mod mst;
mod neighbors;
mod pagerank;
mod traverse;
mod weight;

/// Level-synchronous breadth-first traversal.
pub use bfs::{breadth_first, BfsOptions};
/// Connected components.
pub use components::{connected_components, ComponentOptions};
/// Dijkstra shortest paths.
pub use dijkstra::{shortest_path, ShortestPathOptions};
/// Disjoint-set forest.
pub use dsu::DisjointSet;
/// Kruskal spanning forests.
pub use mst::{minimum_spanning_tree, MstOptions};
/// Damped PageRank.
pub use pagerank::{page_rank, PageRankOptions};
/// Dispatcher with authorization and a panic boundary.
pub use traverse::{traverse, traverse_store, Algorithm, TraversalOutput};
/// Shared weight extraction.
pub use weight::edge_weight;
