// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The pluggable storage contract the store facade consumes.
use serde::{Deserialize, Serialize};

use crate::entity::{AttrMap, EdgeRecord, Entity, NodeRecord, Patch};
use crate::error::Result;
use crate::ident::{EntityId, ModuleSymbol};
use crate::metadata::EntityKind;
use crate::tx::{CommitReceipt, Transaction, WriteOutcome};

/// Edge orientation relative to a node during traversal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Follow edges whose source is the node.
    #[default]
    Out,
    /// Follow edges whose target is the node.
    In,
    /// Follow edges touching the node from either side.
    Both,
}

/// Storage backend contract.
///
/// The facade serializes writes through one exclusive section per store, so
/// `&mut self` write methods never race. Read methods are called under a
/// shared lock and must not mutate observable state.
///
/// Multi-row reads return records sorted by id. Generated ids are
/// time-ordered, so sorted-by-id approximates insertion order and keeps
/// traversal deterministic.
///
/// An adapter is initialized by its own concrete constructor and torn down
/// through [`StoreAdapter::close`] when its store stops.
pub trait StoreAdapter: Send + Sync {
    /// Validates and stores a new entity, updating every index in the same
    /// atomic section as the primary row.
    fn insert(&mut self, entity: Entity) -> Result<WriteOutcome>;

    /// Applies a partial update: shallow-merges `data`, replaces any direct
    /// fields the patch sets, bumps `version`, refreshes `updated_at`, and
    /// re-validates schema and bindings on the merged record.
    fn update(&mut self, kind: EntityKind, patch: Patch) -> Result<WriteOutcome>;

    /// Removes an entity and its index entries.
    fn delete(&mut self, kind: EntityKind, id: &EntityId) -> Result<WriteOutcome>;

    /// Looks up one entity by id.
    fn get(&self, kind: EntityKind, id: &EntityId) -> Result<Entity>;

    /// Returns every entity of `kind` matching `filter`, sorted by id.
    ///
    /// Filter semantics: for every pair, the named field (direct attribute
    /// first, falling back to the `data` map) must equal the value. The
    /// empty filter matches all. Adapters may serve recognizable filter
    /// prefixes from indices; correctness must be identical to a full scan.
    fn list(&self, kind: EntityKind, filter: &AttrMap) -> Vec<Entity>;

    /// Commits a transaction atomically: all operations apply in order or
    /// none do.
    fn commit(&mut self, tx: Transaction) -> Result<CommitReceipt>;

    /// Drops every row and index, keeping the adapter usable.
    fn clear(&mut self);

    /// Releases adapter resources. Called once on store stop.
    fn close(&mut self) {}

    /// Returns `true` when an entity with `id` exists in `kind`'s table.
    fn contains(&self, kind: EntityKind, id: &EntityId) -> bool;

    /// Looks up one node record.
    fn node(&self, id: &EntityId) -> Option<NodeRecord>;

    /// Every node id, sorted.
    fn node_ids(&self) -> Vec<EntityId>;

    /// Node ids parented under `graph_id`, sorted.
    fn nodes_in_graph(&self, graph_id: &EntityId) -> Vec<EntityId>;

    /// Edges whose source is `node`, optionally restricted to one edge
    /// module, sorted by id.
    fn edges_from(&self, node: &EntityId, module: Option<&ModuleSymbol>) -> Vec<EdgeRecord>;

    /// Edges whose target is `node`, optionally restricted to one edge
    /// module, sorted by id.
    fn edges_to(&self, node: &EntityId, module: Option<&ModuleSymbol>) -> Vec<EdgeRecord>;

    /// Every edge of one module, sorted by id.
    fn edges_with_module(&self, module: &ModuleSymbol) -> Vec<EdgeRecord>;

    /// Every edge, sorted by id.
    fn all_edges(&self) -> Vec<EdgeRecord>;

    /// Number of stored nodes.
    fn node_count(&self) -> usize;

    /// Number of stored edges.
    fn edge_count(&self) -> usize;

    /// Number of stored graphs.
    fn graph_count(&self) -> usize;
}
