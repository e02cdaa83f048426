// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Connected components over a disjoint-set forest.
use rustc_hash::FxHashMap;
use trellis_core::{Direction, EntityId, ModuleSymbol, StoreView};

use crate::dsu::DisjointSet;

/// Options for [`connected_components`].
#[derive(Clone, Debug, Default)]
pub struct ComponentOptions {
    /// Restrict connectivity to edges of one module.
    pub edge_module: Option<ModuleSymbol>,
    /// Kept for API symmetry with the traversals. Union-find connectivity
    /// is symmetric, so `Out`, `In`, and `Both` produce the same partition.
    pub direction: Direction,
}

/// Partitions the node set into connected components.
///
/// Each component lists its node ids in sorted order; components are
/// ordered by their smallest member. Edges are iterated once; edges whose
/// endpoints are missing from the node table connect nothing.
#[must_use]
pub fn connected_components(view: &StoreView<'_>, opts: &ComponentOptions) -> Vec<Vec<EntityId>> {
    let node_ids = view.node_ids();
    let index: FxHashMap<&EntityId, usize> = node_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id, i))
        .collect();

    let mut dsu = DisjointSet::new(node_ids.len());
    let edges = match &opts.edge_module {
        Some(module) => view.edges_with_module(module),
        None => view.all_edges(),
    };
    for edge in &edges {
        if let (Some(&a), Some(&b)) = (index.get(&edge.source), index.get(&edge.target)) {
            dsu.union(a, b);
        }
    }

    let mut grouped: FxHashMap<usize, Vec<EntityId>> = FxHashMap::default();
    for (i, id) in node_ids.iter().enumerate() {
        grouped.entry(dsu.find(i)).or_default().push(id.clone());
    }
    // node_ids is sorted, so each component is already sorted; order
    // components by their smallest member for a deterministic partition.
    let mut components: Vec<Vec<EntityId>> = grouped.into_values().collect();
    components.sort_by(|a, b| a[0].cmp(&b[0]));
    components
}
