// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dijkstra shortest (or longest-within-DAG) paths.
use std::collections::BinaryHeap;

use rustc_hash::{FxHashMap, FxHashSet};
use trellis_core::{
    Direction, EntityId, EntityKind, Error, ModuleSymbol, NodeRecord, Result, StoreView,
};

use crate::neighbors::incident;
use crate::weight::edge_weight;

/// Options for [`shortest_path`].
#[derive(Clone, Debug)]
pub struct ShortestPathOptions {
    /// Restrict traversal to edges of one module.
    pub edge_module: Option<ModuleSymbol>,
    /// Edge orientation to follow.
    pub direction: Direction,
    /// Where weights live in `data` when the field is unset.
    pub weight_property: String,
    /// Weight assumed for edges carrying none.
    pub default_weight: f64,
    /// Minimize total weight when `true`. When `false` the comparator is
    /// inverted, yielding a longest-path semantic — the caller asserts the
    /// reachable subgraph has no positive cycles, or the result is
    /// unspecified.
    pub prefer_lower_weights: bool,
}

impl Default for ShortestPathOptions {
    fn default() -> Self {
        Self {
            edge_module: None,
            direction: Direction::Out,
            weight_property: "weight".to_owned(),
            default_weight: 1.0,
            prefer_lower_weights: true,
        }
    }
}

/// Heap entry ordered by `key`, then id for determinism. `key` is the
/// (possibly negated) tentative distance so the max-heap pops the best
/// frontier node first.
struct HeapEntry {
    key: f64,
    cost: f64,
    id: EntityId,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key
            .total_cmp(&other.key)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Computes the best path from `source` to `target` and its total weight.
///
/// In the default (minimizing) mode this is classic Dijkstra: a
/// min-priority queue keyed by tentative distance, a node finalized on
/// first dequeue and never revisited. Negative weights are unsupported —
/// the result is unspecified if any are encountered.
///
/// With `prefer_lower_weights = false` the comparator inverts and nodes
/// stay relaxable until the queue drains, yielding a longest-path
/// semantic. The caller asserts the reachable subgraph has no positive
/// cycles; with one, the search does not terminate in bounded time.
///
/// # Errors
///
/// [`Error::EntityNotFound`] when either endpoint is missing;
/// [`Error::NoPath`] when `target` is unreachable under the options.
pub fn shortest_path(
    view: &StoreView<'_>,
    source: &EntityId,
    target: &EntityId,
    opts: &ShortestPathOptions,
) -> Result<(Vec<NodeRecord>, f64)> {
    for endpoint in [source, target] {
        if view
            .node(endpoint)
            .filter(|node| node.metadata.is_live())
            .is_none()
        {
            return Err(Error::EntityNotFound {
                kind: EntityKind::Node,
                id: endpoint.clone(),
            });
        }
    }

    let better = |candidate: f64, current: f64| {
        if opts.prefer_lower_weights {
            candidate < current
        } else {
            candidate > current
        }
    };
    let heap_key = |cost: f64| if opts.prefer_lower_weights { -cost } else { cost };

    let mut dist: FxHashMap<EntityId, f64> = FxHashMap::default();
    let mut prev: FxHashMap<EntityId, EntityId> = FxHashMap::default();
    let mut finalized: FxHashSet<EntityId> = FxHashSet::default();
    let mut heap: BinaryHeap<HeapEntry> = BinaryHeap::new();

    dist.insert(source.clone(), 0.0);
    heap.push(HeapEntry {
        key: heap_key(0.0),
        cost: 0.0,
        id: source.clone(),
    });

    while let Some(HeapEntry { cost, id, .. }) = heap.pop() {
        if opts.prefer_lower_weights {
            if !finalized.insert(id.clone()) {
                continue;
            }
            if &id == target {
                return Ok((reconstruct(view, &prev, source, target), cost));
            }
        } else {
            // Longest-path mode: only the entry carrying the current best
            // tentative distance is live; everything else is stale.
            match dist.get(&id) {
                Some(current) if (*current - cost).abs() < f64::EPSILON => {}
                _ => continue,
            }
        }
        for (edge, neighbor) in incident(view, &id, opts.direction, opts.edge_module.as_ref()) {
            if opts.prefer_lower_weights && finalized.contains(&neighbor) {
                continue;
            }
            if view
                .node(&neighbor)
                .filter(|n| n.metadata.is_live())
                .is_none()
            {
                continue;
            }
            let candidate = cost + edge_weight(&edge, &opts.weight_property, opts.default_weight);
            let improves = dist
                .get(&neighbor)
                .is_none_or(|current| better(candidate, *current));
            if improves {
                dist.insert(neighbor.clone(), candidate);
                prev.insert(neighbor.clone(), id.clone());
                heap.push(HeapEntry {
                    key: heap_key(candidate),
                    cost: candidate,
                    id: neighbor,
                });
            }
        }
    }

    match dist.get(target) {
        Some(total) if !opts.prefer_lower_weights => {
            Ok((reconstruct(view, &prev, source, target), *total))
        }
        _ => Err(Error::NoPath {
            from: source.clone(),
            target: target.clone(),
        }),
    }
}

/// Walks the predecessor map back from `target` and materializes records.
fn reconstruct(
    view: &StoreView<'_>,
    prev: &FxHashMap<EntityId, EntityId>,
    source: &EntityId,
    target: &EntityId,
) -> Vec<NodeRecord> {
    let mut ids = vec![target.clone()];
    let mut cursor = target;
    while cursor != source {
        let Some(parent) = prev.get(cursor) else {
            break;
        };
        ids.push(parent.clone());
        cursor = parent;
    }
    ids.reverse();
    ids.iter().filter_map(|id| view.node(id)).collect()
}
