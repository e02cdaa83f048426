// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Kruskal spanning forests.
use rustc_hash::FxHashMap;
use trellis_core::{EdgeRecord, EntityId, ModuleSymbol, StoreView};

use crate::dsu::DisjointSet;
use crate::weight::edge_weight;

/// Options for [`minimum_spanning_tree`].
#[derive(Clone, Debug)]
pub struct MstOptions {
    /// Restrict candidate edges to one module.
    pub edge_module: Option<ModuleSymbol>,
    /// Where weights live in `data` when the field is unset.
    pub weight_property: String,
    /// Weight assumed for edges carrying none.
    pub default_weight: f64,
    /// Minimum forest when `true`, maximum forest otherwise.
    pub prefer_lower_weights: bool,
}

impl Default for MstOptions {
    fn default() -> Self {
        Self {
            edge_module: None,
            weight_property: "weight".to_owned(),
            default_weight: 1.0,
            prefer_lower_weights: true,
        }
    }
}

/// Computes a minimum (or maximum) spanning forest and its total weight.
///
/// Candidate edges are sorted by weight (ties break by id), then added in
/// order unless they would close a cycle, detected by the disjoint set.
/// One tree per connected component; an empty store yields an empty
/// forest. Edges are treated as undirected.
#[must_use]
pub fn minimum_spanning_tree(
    view: &StoreView<'_>,
    opts: &MstOptions,
) -> (Vec<EdgeRecord>, f64) {
    let node_ids = view.node_ids();
    let index: FxHashMap<&EntityId, usize> = node_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id, i))
        .collect();

    let mut edges = match &opts.edge_module {
        Some(module) => view.edges_with_module(module),
        None => view.all_edges(),
    };
    edges.sort_by(|a, b| {
        let wa = edge_weight(a, &opts.weight_property, opts.default_weight);
        let wb = edge_weight(b, &opts.weight_property, opts.default_weight);
        let ordering = if opts.prefer_lower_weights {
            wa.total_cmp(&wb)
        } else {
            wb.total_cmp(&wa)
        };
        ordering.then_with(|| a.id.cmp(&b.id))
    });

    let mut dsu = DisjointSet::new(node_ids.len());
    let mut forest: Vec<EdgeRecord> = Vec::new();
    let mut total = 0.0_f64;
    for edge in edges {
        let (Some(&u), Some(&v)) = (index.get(&edge.source), index.get(&edge.target)) else {
            continue;
        };
        if dsu.union(u, v) {
            total += edge_weight(&edge, &opts.weight_property, opts.default_weight);
            forest.push(edge);
        }
    }
    (forest, total)
}
