// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared indexed edge iteration over a store view.
use trellis_core::{Direction, EdgeRecord, EntityId, ModuleSymbol, StoreView};

/// Returns the edges incident to `node` under `direction`, paired with the
/// far endpoint, in id order per index bucket.
///
/// Under [`Direction::Both`] a self-loop surfaces twice (once per side);
/// traversals dedupe through their visited sets.
pub(crate) fn incident(
    view: &StoreView<'_>,
    node: &EntityId,
    direction: Direction,
    module: Option<&ModuleSymbol>,
) -> Vec<(EdgeRecord, EntityId)> {
    let mut pairs: Vec<(EdgeRecord, EntityId)> = Vec::new();
    if matches!(direction, Direction::Out | Direction::Both) {
        for edge in view.edges_from(node, module) {
            let neighbor = edge.target.clone();
            pairs.push((edge, neighbor));
        }
    }
    if matches!(direction, Direction::In | Direction::Both) {
        for edge in view.edges_to(node, module) {
            let neighbor = edge.source.clone();
            pairs.push((edge, neighbor));
        }
    }
    pairs
}
