// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Level-synchronous breadth-first traversal.
use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use trellis_core::{
    Direction, EntityId, EntityKind, Error, ModuleSymbol, NodeRecord, Result, StoreView,
};

use crate::neighbors::incident;
use crate::weight::edge_weight;

/// Options for [`breadth_first`].
#[derive(Clone, Debug)]
pub struct BfsOptions {
    /// Deepest level visited; the start node sits at depth 0, inclusive.
    pub max_depth: usize,
    /// Restrict traversal to edges of one module.
    pub edge_module: Option<ModuleSymbol>,
    /// Edge orientation to follow.
    pub direction: Direction,
    /// Order same-parent neighbors by edge weight.
    pub weighted: bool,
    /// Where weights live in `data` when the field is unset.
    pub weight_property: String,
    /// Ascending weight order when `true`, descending otherwise.
    pub prefer_lower_weights: bool,
    /// Weight assumed for edges carrying none.
    pub default_weight: f64,
}

impl Default for BfsOptions {
    fn default() -> Self {
        Self {
            max_depth: 10,
            edge_module: None,
            direction: Direction::Out,
            weighted: false,
            weight_property: "weight".to_owned(),
            prefer_lower_weights: true,
            default_weight: 1.0,
        }
    }
}

/// Returns nodes in discovery order from `start`, level by level.
///
/// The traversal stays level-synchronous even in weighted mode: weights
/// only order neighbors of the same parent, breaking ties within a level.
/// This is not best-first search — callers needing true weighted shortest
/// paths want [`crate::shortest_path`].
///
/// Edges whose far endpoint is missing or soft-deleted are skipped.
///
/// # Errors
///
/// [`Error::EntityNotFound`] when `start` is absent or soft-deleted.
pub fn breadth_first(
    view: &StoreView<'_>,
    start: &EntityId,
    opts: &BfsOptions,
) -> Result<Vec<NodeRecord>> {
    let start_node = view
        .node(start)
        .filter(|node| node.metadata.is_live())
        .ok_or_else(|| Error::EntityNotFound {
            kind: EntityKind::Node,
            id: start.clone(),
        })?;

    let mut visited: FxHashSet<EntityId> = FxHashSet::default();
    visited.insert(start.clone());
    let mut discovered = vec![start_node];
    let mut queue: VecDeque<(EntityId, usize)> = VecDeque::new();
    queue.push_back((start.clone(), 0));

    while let Some((id, depth)) = queue.pop_front() {
        if depth == opts.max_depth {
            continue;
        }
        let mut edges = incident(view, &id, opts.direction, opts.edge_module.as_ref());
        if opts.weighted {
            // Stable sort: equal weights keep id order from the index.
            edges.sort_by(|(a, _), (b, _)| {
                let wa = edge_weight(a, &opts.weight_property, opts.default_weight);
                let wb = edge_weight(b, &opts.weight_property, opts.default_weight);
                if opts.prefer_lower_weights {
                    wa.total_cmp(&wb)
                } else {
                    wb.total_cmp(&wa)
                }
            });
        }
        for (_, neighbor) in edges {
            if !visited.insert(neighbor.clone()) {
                continue;
            }
            let Some(node) = view.node(&neighbor).filter(|n| n.metadata.is_live()) else {
                continue;
            };
            discovered.push(node);
            queue.push_back((neighbor, depth + 1));
        }
    }
    Ok(discovered)
}
