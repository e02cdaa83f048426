// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The traverse dispatcher: routing, Execute authorization, and the panic
//! boundary's error shape.
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use trellis_algo::{
    traverse, Algorithm, BfsOptions, ComponentOptions, MstOptions, PageRankOptions,
    ShortestPathOptions, TraversalOutput,
};
use trellis_core::{
    AccessOverlay, Action, Decision, Direction, EdgeRecord, Error, NodeRecord, OpContext, Store,
    StoreConfig, StoreHandle,
};

fn seed_triangle(store: &StoreHandle) {
    for name in ["a", "b", "c"] {
        store
            .insert(NodeRecord::new("vertex").with_id(name))
            .unwrap();
    }
    store
        .insert(EdgeRecord::new("link", "a", "b").with_id("e1").with_weight(1.0))
        .unwrap();
    store
        .insert(EdgeRecord::new("link", "b", "c").with_id("e2").with_weight(2.0))
        .unwrap();
    store
        .insert(EdgeRecord::new("link", "c", "a").with_id("e3").with_weight(4.0))
        .unwrap();
}

#[test]
fn every_algorithm_routes_to_its_output_shape() {
    let store = Store::start("dispatch-shapes", StoreConfig::default()).unwrap();
    seed_triangle(&store);

    let out = traverse(
        &store,
        Algorithm::Bfs {
            start: "a".into(),
            options: BfsOptions::default(),
        },
    )
    .unwrap();
    let TraversalOutput::Nodes(nodes) = out else {
        unreachable!("bfs must yield Nodes");
    };
    assert_eq!(nodes.len(), 3);

    let out = traverse(
        &store,
        Algorithm::ShortestPath {
            source: "a".into(),
            target: "c".into(),
            options: ShortestPathOptions {
                direction: Direction::Both,
                ..ShortestPathOptions::default()
            },
        },
    )
    .unwrap();
    let TraversalOutput::Path { nodes, total_weight } = out else {
        unreachable!("shortest_path must yield Path");
    };
    assert_eq!(nodes.len(), 3, "a-b-c beats the weight-4 direct edge");
    assert!((total_weight - 3.0).abs() < 1e-9);

    let out = traverse(
        &store,
        Algorithm::ConnectedComponents {
            options: ComponentOptions::default(),
        },
    )
    .unwrap();
    let TraversalOutput::Components(components) = out else {
        unreachable!("components must yield Components");
    };
    assert_eq!(components.len(), 1);

    let out = traverse(
        &store,
        Algorithm::PageRank {
            options: PageRankOptions::default(),
        },
    )
    .unwrap();
    let TraversalOutput::Ranks(ranks) = out else {
        unreachable!("page_rank must yield Ranks");
    };
    assert_eq!(ranks.len(), 3);

    let out = traverse(
        &store,
        Algorithm::MinimumSpanningTree {
            options: MstOptions::default(),
        },
    )
    .unwrap();
    let TraversalOutput::Forest { edges, total_weight } = out else {
        unreachable!("mst must yield Forest");
    };
    assert_eq!(edges.len(), 2);
    assert!((total_weight - 3.0).abs() < 1e-9);

    Store::stop("dispatch-shapes").unwrap();
}

#[test]
fn algorithm_errors_pass_through_typed() {
    let store = Store::start("dispatch-errors", StoreConfig::default()).unwrap();

    let err = traverse(
        &store,
        Algorithm::PageRank {
            options: PageRankOptions::default(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, Error::GraphEmpty));

    let err = traverse(
        &store,
        Algorithm::Bfs {
            start: "ghost".into(),
            options: BfsOptions::default(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, Error::EntityNotFound { .. }));

    Store::stop("dispatch-errors").unwrap();
}

struct NoExecute;

impl AccessOverlay for NoExecute {
    fn before(&self, op: &OpContext) -> Decision {
        if op.action == Action::Execute {
            Decision::Deny {
                reason: "algorithms disabled".to_owned(),
            }
        } else {
            Decision::Allow
        }
    }
}

#[test]
fn the_overlay_gates_execute_operations() {
    let store = Store::start(
        "dispatch-overlay",
        StoreConfig::default().with_overlay(Arc::new(NoExecute)),
    )
    .unwrap();
    seed_triangle(&store);

    let err = traverse(
        &store,
        Algorithm::Bfs {
            start: "a".into(),
            options: BfsOptions::default(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, Error::Unauthorized { ref operation } if operation == "bfs"));

    Store::stop("dispatch-overlay").unwrap();
}
