// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Damped PageRank with dangling-node redistribution.
use rustc_hash::FxHashMap;
use trellis_core::{EntityId, Error, Result, StoreView};

use crate::weight::edge_weight;

/// Options for [`page_rank`].
#[derive(Clone, Debug)]
pub struct PageRankOptions {
    /// Maximum number of iterations.
    pub iterations: usize,
    /// Damping factor `d` in the update rule.
    pub damping: f64,
    /// Weight edges by their extracted weight instead of uniformly.
    pub weighted: bool,
    /// Where weights live in `data` when the field is unset.
    pub weight_property: String,
    /// Stop once the L1 distance between successive rank vectors drops
    /// below this.
    pub convergence_threshold: f64,
    /// Weight assumed for edges carrying none (weighted mode).
    pub default_weight: f64,
}

impl Default for PageRankOptions {
    fn default() -> Self {
        Self {
            iterations: 20,
            damping: 0.85,
            weighted: false,
            weight_property: "weight".to_owned(),
            convergence_threshold: 1e-4,
            default_weight: 1.0,
        }
    }
}

/// Computes a rank per node; ranks sum to ≈ 1.0.
///
/// Update rule per iteration:
/// `rank'(v) = (1 − d)/N + d · Σ_{u → v} rank(u) · w(u→v)/Σ_{u → x} w(u→x)`.
/// Nodes with no outgoing edges distribute their mass uniformly. Stops at
/// `iterations` or when the L1 delta falls below the threshold.
///
/// # Errors
///
/// [`Error::GraphEmpty`] when the store holds no nodes.
pub fn page_rank(view: &StoreView<'_>, opts: &PageRankOptions) -> Result<FxHashMap<EntityId, f64>> {
    let node_ids = view.node_ids();
    let n = node_ids.len();
    if n == 0 {
        return Err(Error::GraphEmpty);
    }
    let index: FxHashMap<&EntityId, usize> = node_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id, i))
        .collect();

    // (source, target, weight) with both endpoints present, plus per-source
    // outgoing weight sums.
    let mut links: Vec<(usize, usize, f64)> = Vec::new();
    let mut out_weight = vec![0.0_f64; n];
    for edge in view.all_edges() {
        let (Some(&u), Some(&v)) = (index.get(&edge.source), index.get(&edge.target)) else {
            continue;
        };
        let w = if opts.weighted {
            edge_weight(&edge, &opts.weight_property, opts.default_weight)
        } else {
            1.0
        };
        if w <= 0.0 {
            continue;
        }
        out_weight[u] += w;
        links.push((u, v, w));
    }

    #[allow(clippy::cast_precision_loss)]
    let n_f = n as f64;
    let base = (1.0 - opts.damping) / n_f;
    let mut rank = vec![1.0 / n_f; n];

    for _ in 0..opts.iterations {
        let dangling_mass: f64 = (0..n)
            .filter(|&u| out_weight[u] <= 0.0)
            .map(|u| rank[u])
            .sum();
        let mut next = vec![base + opts.damping * dangling_mass / n_f; n];
        for &(u, v, w) in &links {
            next[v] += opts.damping * rank[u] * w / out_weight[u];
        }

        let delta: f64 = rank
            .iter()
            .zip(&next)
            .map(|(a, b)| (a - b).abs())
            .sum();
        rank = next;
        if delta < opts.convergence_threshold {
            break;
        }
    }

    Ok(node_ids
        .into_iter()
        .zip(rank)
        .collect())
}
