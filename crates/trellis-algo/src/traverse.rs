// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Algorithm dispatcher with a panic boundary.
use std::panic::{catch_unwind, AssertUnwindSafe};

use rustc_hash::FxHashMap;
use trellis_core::{
    Action, EdgeRecord, EntityId, Error, NodeRecord, Result, Store, StoreHandle, StoreView,
};

use crate::bfs::{breadth_first, BfsOptions};
use crate::components::{connected_components, ComponentOptions};
use crate::dijkstra::{shortest_path, ShortestPathOptions};
use crate::mst::{minimum_spanning_tree, MstOptions};
use crate::pagerank::{page_rank, PageRankOptions};

/// One algorithm invocation, as accepted by [`traverse`].
#[derive(Clone, Debug)]
pub enum Algorithm {
    /// Level-synchronous BFS from a start node.
    Bfs {
        /// Traversal origin.
        start: EntityId,
        /// Traversal options.
        options: BfsOptions,
    },
    /// Best path between two nodes.
    ShortestPath {
        /// Path source.
        source: EntityId,
        /// Path target.
        target: EntityId,
        /// Traversal options.
        options: ShortestPathOptions,
    },
    /// Partition of the node set by connectivity.
    ConnectedComponents {
        /// Partition options.
        options: ComponentOptions,
    },
    /// Damped PageRank over the whole store.
    PageRank {
        /// Iteration options.
        options: PageRankOptions,
    },
    /// Kruskal spanning forest.
    MinimumSpanningTree {
        /// Forest options.
        options: MstOptions,
    },
}

impl Algorithm {
    /// Stable operation name used for authorization and logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bfs { .. } => "bfs",
            Self::ShortestPath { .. } => "shortest_path",
            Self::ConnectedComponents { .. } => "connected_components",
            Self::PageRank { .. } => "page_rank",
            Self::MinimumSpanningTree { .. } => "minimum_spanning_tree",
        }
    }
}

/// Result of one [`traverse`] call.
#[derive(Clone, Debug)]
pub enum TraversalOutput {
    /// BFS discovery order.
    Nodes(Vec<NodeRecord>),
    /// Shortest-path result.
    Path {
        /// Nodes from source to target inclusive.
        nodes: Vec<NodeRecord>,
        /// Sum of edge weights along the path.
        total_weight: f64,
    },
    /// Connected components, each a sorted id list.
    Components(Vec<Vec<EntityId>>),
    /// PageRank scores, summing to ≈ 1.0.
    Ranks(FxHashMap<EntityId, f64>),
    /// Spanning forest edges and their total weight.
    Forest {
        /// Edges in the forest.
        edges: Vec<EdgeRecord>,
        /// Sum of forest edge weights.
        total_weight: f64,
    },
}

fn run(view: &StoreView<'_>, algorithm: Algorithm) -> Result<TraversalOutput> {
    match algorithm {
        Algorithm::Bfs { start, options } => {
            breadth_first(view, &start, &options).map(TraversalOutput::Nodes)
        }
        Algorithm::ShortestPath {
            source,
            target,
            options,
        } => shortest_path(view, &source, &target, &options).map(|(nodes, total_weight)| {
            TraversalOutput::Path {
                nodes,
                total_weight,
            }
        }),
        Algorithm::ConnectedComponents { options } => Ok(TraversalOutput::Components(
            connected_components(view, &options),
        )),
        Algorithm::PageRank { options } => {
            page_rank(view, &options).map(TraversalOutput::Ranks)
        }
        Algorithm::MinimumSpanningTree { options } => {
            let (edges, total_weight) = minimum_spanning_tree(view, &options);
            Ok(TraversalOutput::Forest {
                edges,
                total_weight,
            })
        }
    }
}

/// Runs an algorithm against a named store.
///
/// Name-routed convenience over [`traverse`].
pub fn traverse_store(name: &str, algorithm: Algorithm) -> Result<TraversalOutput> {
    traverse(&Store::handle(name)?, algorithm)
}

/// Runs an algorithm against a store under its read lock.
///
/// The overlay's `Execute` pre-hook gates the call; the algorithm body runs
/// inside a panic boundary so a bug in an algorithm (or in data it trips
/// over) surfaces as [`Error::Internal`] instead of unwinding through the
/// store.
pub fn traverse(handle: &StoreHandle, algorithm: Algorithm) -> Result<TraversalOutput> {
    handle.authorize(Action::Execute, None, None, algorithm.name())?;
    let name = algorithm.name();
    let view = handle.view();
    catch_unwind(AssertUnwindSafe(|| run(&view, algorithm))).unwrap_or_else(|payload| {
        let details = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "algorithm panicked".to_owned());
        tracing::error!(algorithm = name, details, "algorithm panicked");
        Err(Error::Internal { details })
    })
}
