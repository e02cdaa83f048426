// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Write-through structural indices for the in-memory adapter.
//!
//! Every index is updated in the same exclusive section as its primary row,
//! so readers never observe a row missing from its indices or a stale entry
//! after a delete. Buckets are erased when they empty so index maps never
//! accumulate tombstones.
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;

use crate::entity::{AttrMap, EdgeRecord, NodeRecord};
use crate::ident::{EntityId, ModuleSymbol};

type Bucket = FxHashSet<EntityId>;

/// Structural indices over the node and edge tables.
#[derive(Debug, Default)]
pub(crate) struct Indexes {
    nodes_by_graph: FxHashMap<EntityId, Bucket>,
    edges_by_source: FxHashMap<EntityId, Bucket>,
    edges_by_target: FxHashMap<EntityId, Bucket>,
    edges_by_module: FxHashMap<ModuleSymbol, Bucket>,
    edges_by_source_module: FxHashMap<(EntityId, ModuleSymbol), Bucket>,
    edges_by_target_module: FxHashMap<(EntityId, ModuleSymbol), Bucket>,
}

/// How a `list` over edges (or nodes) will be served.
#[derive(Debug)]
pub(crate) enum Plan<'a> {
    /// No usable filter prefix; scan the table.
    Scan,
    /// Serve candidates from one index bucket; residual filter still applies.
    Hit(&'a Bucket),
    /// A filter key matched an index with no bucket: provably empty.
    Empty,
}

fn insert_into<K: std::hash::Hash + Eq>(map: &mut FxHashMap<K, Bucket>, key: K, id: &EntityId) {
    map.entry(key).or_default().insert(id.clone());
}

fn remove_from<K: std::hash::Hash + Eq>(map: &mut FxHashMap<K, Bucket>, key: &K, id: &EntityId) {
    if let Some(bucket) = map.get_mut(key) {
        bucket.remove(id);
        if bucket.is_empty() {
            map.remove(key);
        }
    }
}

fn filter_str<'a>(filter: &'a AttrMap, key: &str) -> Option<&'a str> {
    filter.get(key).and_then(Value::as_str)
}

/// Records one candidate index bucket; a recognized filter key whose bucket
/// is absent proves the query result empty.
fn consider<'a>(
    candidates: &mut Vec<(&'a Bucket, u8)>,
    provably_empty: &mut bool,
    bucket: Option<&'a Bucket>,
    specificity: u8,
) {
    match bucket {
        None => *provably_empty = true,
        Some(bucket) => candidates.push((bucket, specificity)),
    }
}

impl Indexes {
    pub(crate) fn index_node(&mut self, node: &NodeRecord) {
        if let Some(graph_id) = &node.graph_id {
            insert_into(&mut self.nodes_by_graph, graph_id.clone(), &node.id);
        }
    }

    pub(crate) fn unindex_node(&mut self, node: &NodeRecord) {
        if let Some(graph_id) = &node.graph_id {
            remove_from(&mut self.nodes_by_graph, graph_id, &node.id);
        }
    }

    pub(crate) fn index_edge(&mut self, edge: &EdgeRecord) {
        let module = edge.metadata.module.clone();
        insert_into(&mut self.edges_by_source, edge.source.clone(), &edge.id);
        insert_into(&mut self.edges_by_target, edge.target.clone(), &edge.id);
        insert_into(&mut self.edges_by_module, module.clone(), &edge.id);
        insert_into(
            &mut self.edges_by_source_module,
            (edge.source.clone(), module.clone()),
            &edge.id,
        );
        insert_into(
            &mut self.edges_by_target_module,
            (edge.target.clone(), module),
            &edge.id,
        );
    }

    pub(crate) fn unindex_edge(&mut self, edge: &EdgeRecord) {
        let module = edge.metadata.module.clone();
        remove_from(&mut self.edges_by_source, &edge.source, &edge.id);
        remove_from(&mut self.edges_by_target, &edge.target, &edge.id);
        remove_from(&mut self.edges_by_module, &module, &edge.id);
        remove_from(
            &mut self.edges_by_source_module,
            &(edge.source.clone(), module.clone()),
            &edge.id,
        );
        remove_from(
            &mut self.edges_by_target_module,
            &(edge.target.clone(), module),
            &edge.id,
        );
    }

    pub(crate) fn clear(&mut self) {
        self.nodes_by_graph.clear();
        self.edges_by_source.clear();
        self.edges_by_target.clear();
        self.edges_by_module.clear();
        self.edges_by_source_module.clear();
        self.edges_by_target_module.clear();
    }

    pub(crate) fn nodes_in_graph(&self, graph_id: &EntityId) -> Option<&Bucket> {
        self.nodes_by_graph.get(graph_id)
    }

    pub(crate) fn edges_from(&self, node: &EntityId) -> Option<&Bucket> {
        self.edges_by_source.get(node)
    }

    pub(crate) fn edges_to(&self, node: &EntityId) -> Option<&Bucket> {
        self.edges_by_target.get(node)
    }

    pub(crate) fn edges_with_module(&self, module: &ModuleSymbol) -> Option<&Bucket> {
        self.edges_by_module.get(module)
    }

    pub(crate) fn edges_from_with_module(
        &self,
        node: &EntityId,
        module: &ModuleSymbol,
    ) -> Option<&Bucket> {
        self.edges_by_source_module
            .get(&(node.clone(), module.clone()))
    }

    pub(crate) fn edges_to_with_module(
        &self,
        node: &EntityId,
        module: &ModuleSymbol,
    ) -> Option<&Bucket> {
        self.edges_by_target_module
            .get(&(node.clone(), module.clone()))
    }

    /// Plans a node `list`: a `graph_id` filter key dispatches through
    /// `nodes_by_graph`.
    pub(crate) fn plan_nodes(&self, filter: &AttrMap) -> Plan<'_> {
        match filter_str(filter, "graph_id") {
            None => Plan::Scan,
            Some(graph_id) => self
                .nodes_by_graph
                .get(&EntityId::from(graph_id))
                .map_or(Plan::Empty, Plan::Hit),
        }
    }

    /// Plans an edge `list` from its filter prefix.
    ///
    /// Recognized prefixes, most specific first: `(source, type)`,
    /// `(target, type)`, `(type)`, `(source)`, `(target)`. Among applicable
    /// indices the minimum-cardinality bucket wins; ties break toward the
    /// most specific. The residual filter is evaluated per row either way,
    /// so correctness is identical to a scan.
    pub(crate) fn plan_edges(&self, filter: &AttrMap) -> Plan<'_> {
        let source = filter_str(filter, "source").map(EntityId::from);
        let target = filter_str(filter, "target").map(EntityId::from);
        let module = filter_str(filter, "type").map(ModuleSymbol::intern);

        // (candidate bucket, specificity); a recognized key with no bucket
        // proves the result empty.
        let mut candidates: Vec<(&Bucket, u8)> = Vec::new();
        let mut provably_empty = false;

        match (&source, &module) {
            (Some(s), Some(m)) => consider(
                &mut candidates,
                &mut provably_empty,
                self.edges_by_source_module.get(&(s.clone(), m.clone())),
                2,
            ),
            (Some(s), None) => consider(
                &mut candidates,
                &mut provably_empty,
                self.edges_by_source.get(s),
                1,
            ),
            _ => {}
        }
        match (&target, &module) {
            (Some(t), Some(m)) => consider(
                &mut candidates,
                &mut provably_empty,
                self.edges_by_target_module.get(&(t.clone(), m.clone())),
                2,
            ),
            (Some(t), None) => consider(
                &mut candidates,
                &mut provably_empty,
                self.edges_by_target.get(t),
                1,
            ),
            _ => {}
        }
        if let Some(m) = &module {
            consider(
                &mut candidates,
                &mut provably_empty,
                self.edges_by_module.get(m),
                1,
            );
        }

        if provably_empty {
            return Plan::Empty;
        }
        candidates
            .into_iter()
            .min_by_key(|(bucket, specificity)| (bucket.len(), std::cmp::Reverse(*specificity)))
            .map_or(Plan::Scan, |(bucket, _)| Plan::Hit(bucket))
    }
}
