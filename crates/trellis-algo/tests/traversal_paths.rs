// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! BFS ordering/depth semantics and Dijkstra path correctness.
#![allow(clippy::expect_used, clippy::unwrap_used)]

use trellis_algo::{breadth_first, shortest_path, BfsOptions, ShortestPathOptions};
use trellis_core::{
    Direction, EdgeRecord, EntityId, Error, NodeRecord, Store, StoreConfig, StoreHandle,
};

fn ids(nodes: &[trellis_core::NodeRecord]) -> Vec<&str> {
    nodes.iter().map(|n| n.id.as_str()).collect()
}

fn seed_nodes(store: &StoreHandle, names: &[&str]) {
    for name in names {
        store
            .insert(NodeRecord::new("vertex").with_id(*name))
            .unwrap();
    }
}

fn seed_edge(store: &StoreHandle, id: &str, from: &str, to: &str, weight: f64) {
    store
        .insert(
            EdgeRecord::new("link", from, to)
                .with_id(id)
                .with_weight(weight),
        )
        .unwrap();
}

#[test]
fn bfs_discovers_level_by_level_and_respects_max_depth() {
    let store = Store::start("algo-bfs-depth", StoreConfig::default()).unwrap();
    seed_nodes(&store, &["a", "b", "c", "d"]);
    seed_edge(&store, "e1", "a", "b", 1.0);
    seed_edge(&store, "e2", "b", "c", 1.0);
    seed_edge(&store, "e3", "c", "d", 1.0);

    let view = store.view();
    let all = breadth_first(&view, &"a".into(), &BfsOptions::default()).unwrap();
    assert_eq!(ids(&all), ["a", "b", "c", "d"]);

    let capped = breadth_first(
        &view,
        &"a".into(),
        &BfsOptions {
            max_depth: 2,
            ..BfsOptions::default()
        },
    )
    .unwrap();
    assert_eq!(ids(&capped), ["a", "b", "c"], "depth 3 is past the cap");

    drop(view);
    Store::stop("algo-bfs-depth").unwrap();
}

#[test]
fn bfs_returns_exactly_the_reachable_set() {
    let store = Store::start("algo-bfs-reach", StoreConfig::default()).unwrap();
    seed_nodes(&store, &["a", "b", "island"]);
    seed_edge(&store, "e1", "a", "b", 1.0);

    let view = store.view();
    let found = breadth_first(
        &view,
        &"a".into(),
        &BfsOptions {
            max_depth: usize::MAX,
            ..BfsOptions::default()
        },
    )
    .unwrap();
    assert_eq!(ids(&found), ["a", "b"], "islands stay unvisited");

    drop(view);
    Store::stop("algo-bfs-reach").unwrap();
}

#[test]
fn bfs_follows_the_requested_direction() {
    let store = Store::start("algo-bfs-dir", StoreConfig::default()).unwrap();
    seed_nodes(&store, &["a", "b", "c"]);
    seed_edge(&store, "e1", "b", "a", 1.0);
    seed_edge(&store, "e2", "a", "c", 1.0);

    let view = store.view();
    let out = breadth_first(&view, &"a".into(), &BfsOptions::default()).unwrap();
    assert_eq!(ids(&out), ["a", "c"]);

    let inbound = breadth_first(
        &view,
        &"a".into(),
        &BfsOptions {
            direction: Direction::In,
            ..BfsOptions::default()
        },
    )
    .unwrap();
    assert_eq!(ids(&inbound), ["a", "b"]);

    let both = breadth_first(
        &view,
        &"a".into(),
        &BfsOptions {
            direction: Direction::Both,
            ..BfsOptions::default()
        },
    )
    .unwrap();
    assert_eq!(ids(&both), ["a", "c", "b"], "out edges enqueue before in edges");

    drop(view);
    Store::stop("algo-bfs-dir").unwrap();
}

#[test]
fn weighted_bfs_orders_siblings_not_levels() {
    let store = Store::start("algo-bfs-weighted", StoreConfig::default()).unwrap();
    seed_nodes(&store, &["s", "x", "y", "z"]);
    seed_edge(&store, "e1", "s", "x", 3.0);
    seed_edge(&store, "e2", "s", "y", 1.0);
    seed_edge(&store, "e3", "s", "z", 2.0);

    let view = store.view();
    let ascending = breadth_first(
        &view,
        &"s".into(),
        &BfsOptions {
            weighted: true,
            ..BfsOptions::default()
        },
    )
    .unwrap();
    assert_eq!(ids(&ascending), ["s", "y", "z", "x"]);

    let descending = breadth_first(
        &view,
        &"s".into(),
        &BfsOptions {
            weighted: true,
            prefer_lower_weights: false,
            ..BfsOptions::default()
        },
    )
    .unwrap();
    assert_eq!(ids(&descending), ["s", "x", "z", "y"]);

    drop(view);
    Store::stop("algo-bfs-weighted").unwrap();
}

#[test]
fn bfs_missing_start_is_not_found() {
    let store = Store::start("algo-bfs-missing", StoreConfig::default()).unwrap();
    let view = store.view();
    let err = breadth_first(&view, &"ghost".into(), &BfsOptions::default()).unwrap_err();
    assert!(matches!(err, Error::EntityNotFound { .. }));
    drop(view);
    Store::stop("algo-bfs-missing").unwrap();
}

#[test]
fn dijkstra_finds_the_minimum_weight_path() {
    let store = Store::start("algo-dijkstra-min", StoreConfig::default()).unwrap();
    seed_nodes(&store, &["a", "b", "c", "d", "e"]);
    seed_edge(&store, "e1", "a", "b", 5.0);
    seed_edge(&store, "e2", "a", "c", 2.0);
    seed_edge(&store, "e3", "b", "c", 1.0);
    seed_edge(&store, "e4", "b", "d", 3.0);
    seed_edge(&store, "e5", "c", "d", 7.0);
    seed_edge(&store, "e6", "c", "e", 4.0);
    seed_edge(&store, "e7", "d", "e", 6.0);

    let view = store.view();
    let (path, total) = shortest_path(
        &view,
        &"a".into(),
        &"e".into(),
        &ShortestPathOptions {
            direction: Direction::Both,
            ..ShortestPathOptions::default()
        },
    )
    .unwrap();
    assert_eq!(ids(&path), ["a", "c", "e"]);
    assert!((total - 6.0).abs() < 1e-9);

    drop(view);
    Store::stop("algo-dijkstra-min").unwrap();
}

#[test]
fn dijkstra_reads_weights_from_a_data_property() {
    let store = Store::start("algo-dijkstra-prop", StoreConfig::default()).unwrap();
    seed_nodes(&store, &["a", "b", "c"]);
    store
        .insert(EdgeRecord::new("link", "a", "b").with_id("e1").attr("cost", 1.5))
        .unwrap();
    store
        .insert(EdgeRecord::new("link", "b", "c").with_id("e2").attr("cost", 2.5))
        .unwrap();

    let view = store.view();
    let (path, total) = shortest_path(
        &view,
        &"a".into(),
        &"c".into(),
        &ShortestPathOptions {
            weight_property: "cost".to_owned(),
            ..ShortestPathOptions::default()
        },
    )
    .unwrap();
    assert_eq!(ids(&path), ["a", "b", "c"]);
    assert!((total - 4.0).abs() < 1e-9);

    drop(view);
    Store::stop("algo-dijkstra-prop").unwrap();
}

#[test]
fn unreachable_targets_are_no_path() {
    let store = Store::start("algo-dijkstra-nopath", StoreConfig::default()).unwrap();
    seed_nodes(&store, &["a", "b"]);

    let view = store.view();
    let err = shortest_path(
        &view,
        &"a".into(),
        &"b".into(),
        &ShortestPathOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::NoPath { .. }));

    let missing = shortest_path(
        &view,
        &"a".into(),
        &EntityId::from("ghost"),
        &ShortestPathOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(missing, Error::EntityNotFound { .. }));

    drop(view);
    Store::stop("algo-dijkstra-nopath").unwrap();
}

#[test]
fn inverted_comparator_yields_the_heaviest_dag_path() {
    let store = Store::start("algo-dijkstra-max", StoreConfig::default()).unwrap();
    seed_nodes(&store, &["a", "b", "c"]);
    seed_edge(&store, "e1", "a", "b", 3.0);
    seed_edge(&store, "e2", "b", "c", 4.0);
    seed_edge(&store, "e3", "a", "c", 5.0);

    let view = store.view();
    let (path, total) = shortest_path(
        &view,
        &"a".into(),
        &"c".into(),
        &ShortestPathOptions {
            prefer_lower_weights: false,
            ..ShortestPathOptions::default()
        },
    )
    .unwrap();
    assert_eq!(ids(&path), ["a", "b", "c"]);
    assert!((total - 7.0).abs() < 1e-9);

    drop(view);
    Store::stop("algo-dijkstra-max").unwrap();
}
