// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Default in-memory storage adapter.
//!
//! Three primary tables keyed by id plus the structural indices in
//! [`index`]. Rows and index entries always change inside the same
//! exclusive section, so any reader admitted between writes observes a
//! consistent pair. Deletes are hard: the row and its index entries are
//! removed outright. Transactions keep an operation-level undo log and
//! replay it in reverse on failure, which keeps rollback `O(k)` in the
//! number of applied operations rather than snapshotting tables.
mod index;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::adapter::StoreAdapter;
use crate::binding::EdgeSide;
use crate::entity::{AttrMap, EdgeRecord, Entity, GraphRecord, NodeRecord, Patch};
use crate::error::{Error, Result};
use crate::ident::{EntityId, ModuleSymbol};
use crate::metadata::EntityKind;
use crate::tx::{CommitReceipt, Operation, Transaction, WriteOutcome};
use crate::types::TypeRegistry;

use index::{Indexes, Plan};

/// Inverse of one committed operation, replayed in reverse on rollback.
#[derive(Debug)]
enum UndoEntry {
    /// Undo an insert by removing the row.
    RemoveInserted { kind: EntityKind, id: EntityId },
    /// Undo an update by restoring the pre-image.
    RestorePrevious { previous: Entity },
    /// Undo a delete by reinserting the removed row.
    Reinsert { previous: Entity },
}

/// In-memory [`StoreAdapter`] backed by hash tables and write-through
/// indices.
#[derive(Debug)]
pub struct InMemoryAdapter {
    types: Arc<TypeRegistry>,
    graphs: FxHashMap<EntityId, GraphRecord>,
    nodes: FxHashMap<EntityId, NodeRecord>,
    edges: FxHashMap<EntityId, EdgeRecord>,
    indexes: Indexes,
}

impl InMemoryAdapter {
    /// Creates an empty adapter validating against `types`.
    #[must_use]
    pub fn new(types: Arc<TypeRegistry>) -> Self {
        Self {
            types,
            graphs: FxHashMap::default(),
            nodes: FxHashMap::default(),
            edges: FxHashMap::default(),
            indexes: Indexes::default(),
        }
    }

    /// Applies declared defaults and validates `data` against the module's
    /// schema, when one is registered.
    fn validate_schema(&self, module: &ModuleSymbol, data: &mut AttrMap) -> Result<()> {
        if let Some(schema) = self
            .types
            .get(module)
            .and_then(|decl| decl.data_schema.as_ref())
        {
            schema.apply_defaults(data);
            schema.validate(data)?;
        }
        Ok(())
    }

    /// Resolves both endpoints to live nodes and checks the edge type's
    /// bindings against their modules.
    fn check_edge(&self, edge: &EdgeRecord) -> Result<()> {
        let source = self
            .nodes
            .get(&edge.source)
            .filter(|node| node.metadata.is_live())
            .ok_or_else(|| Error::DanglingReference {
                side: EdgeSide::Source,
                id: edge.source.clone(),
            })?;
        let target = self
            .nodes
            .get(&edge.target)
            .filter(|node| node.metadata.is_live())
            .ok_or_else(|| Error::DanglingReference {
                side: EdgeSide::Target,
                id: edge.target.clone(),
            })?;

        if let Some(decl) = self.types.get(&edge.metadata.module) {
            if let Some(reason) = decl.source_binding.check(&source.metadata.module) {
                return Err(Error::BindingViolation {
                    side: EdgeSide::Source,
                    module: source.metadata.module.clone(),
                    reason,
                });
            }
            if let Some(reason) = decl.target_binding.check(&target.metadata.module) {
                return Err(Error::BindingViolation {
                    side: EdgeSide::Target,
                    module: target.metadata.module.clone(),
                    reason,
                });
            }
        }
        Ok(())
    }

    /// Writes a row and its index entries. Callers have already validated.
    fn insert_row(&mut self, entity: Entity) {
        match entity {
            Entity::Graph(graph) => {
                self.graphs.insert(graph.id.clone(), graph);
            }
            Entity::Node(node) => {
                self.indexes.index_node(&node);
                self.nodes.insert(node.id.clone(), node);
            }
            Entity::Edge(edge) => {
                self.indexes.index_edge(&edge);
                self.edges.insert(edge.id.clone(), edge);
            }
        }
    }

    /// Removes a row and its index entries, returning the last image.
    fn remove_row(&mut self, kind: EntityKind, id: &EntityId) -> Option<Entity> {
        match kind {
            EntityKind::Graph => self.graphs.remove(id).map(Entity::Graph),
            EntityKind::Node => self.nodes.remove(id).map(|node| {
                self.indexes.unindex_node(&node);
                Entity::Node(node)
            }),
            EntityKind::Edge => self.edges.remove(id).map(|edge| {
                self.indexes.unindex_edge(&edge);
                Entity::Edge(edge)
            }),
        }
    }

    /// Replaces a row in place, swapping index entries for the old image.
    fn replace_row(&mut self, entity: Entity) {
        let _ = self.remove_row(entity.kind(), entity.id());
        self.insert_row(entity);
    }

    /// Shape checks that need no table state; failures abort a transaction
    /// before any operation runs.
    fn prevalidate(&self, operation: &Operation) -> Result<()> {
        match operation {
            Operation::Insert { entity } => {
                if entity.id().as_str().is_empty() {
                    return Err(Error::InvalidOperation {
                        index: 0,
                        reason: "insert with empty id".to_owned(),
                    });
                }
                let mut data = entity.data().clone();
                self.validate_schema(&entity.metadata().module, &mut data)
            }
            Operation::Update { patch, .. } => {
                if patch.id.as_str().is_empty() {
                    return Err(Error::InvalidOperation {
                        index: 0,
                        reason: "update with empty id".to_owned(),
                    });
                }
                Ok(())
            }
            Operation::Delete { id, .. } => {
                if id.as_str().is_empty() {
                    return Err(Error::InvalidOperation {
                        index: 0,
                        reason: "delete with empty id".to_owned(),
                    });
                }
                Ok(())
            }
        }
    }

    /// Applies one operation, returning its outcome and undo entry.
    fn apply_operation(&mut self, operation: Operation) -> Result<(WriteOutcome, UndoEntry)> {
        match operation {
            Operation::Insert { entity } => {
                let kind = entity.kind();
                let id = entity.id().clone();
                let outcome = self.insert(entity)?;
                Ok((outcome, UndoEntry::RemoveInserted { kind, id }))
            }
            Operation::Update { kind, patch } => {
                let outcome = self.update(kind, patch)?;
                let WriteOutcome::Updated { previous, .. } = &outcome else {
                    return Err(Error::Internal {
                        details: "update produced a non-update outcome".to_owned(),
                    });
                };
                let undo = UndoEntry::RestorePrevious {
                    previous: previous.clone(),
                };
                Ok((outcome, undo))
            }
            Operation::Delete { kind, id } => {
                let outcome = self.delete(kind, &id)?;
                let WriteOutcome::Deleted { previous } = &outcome else {
                    return Err(Error::Internal {
                        details: "delete produced a non-delete outcome".to_owned(),
                    });
                };
                let undo = UndoEntry::Reinsert {
                    previous: previous.clone(),
                };
                Ok((outcome, undo))
            }
        }
    }

    /// Replays undo entries in reverse to restore the pre-transaction state.
    fn rollback(&mut self, undo: Vec<UndoEntry>) {
        for entry in undo.into_iter().rev() {
            match entry {
                UndoEntry::RemoveInserted { kind, id } => {
                    let _ = self.remove_row(kind, &id);
                }
                UndoEntry::RestorePrevious { previous } | UndoEntry::Reinsert { previous } => {
                    self.replace_row(previous);
                }
            }
        }
    }

    fn collect_edges(&self, bucket: Option<&rustc_hash::FxHashSet<EntityId>>) -> Vec<EdgeRecord> {
        let mut edges: Vec<EdgeRecord> = bucket
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id).cloned())
            .collect();
        edges.sort_by(|a, b| a.id.cmp(&b.id));
        edges
    }
}

/// Applies `patch` to `entity`, returning the change set for the update
/// event. Direct fields a patch sets on a mismatched kind are ignored.
fn apply_patch(entity: &mut Entity, patch: &Patch) -> AttrMap {
    let mut changes: AttrMap = patch.data.clone();
    entity.data_mut().extend(patch.data.clone());

    match entity {
        Entity::Graph(graph) => {
            if let Some(name) = &patch.name {
                graph.name = name.clone();
                changes.insert("name".to_owned(), Value::String(name.clone()));
            }
        }
        Entity::Node(node) => {
            if let Some(graph_id) = &patch.graph_id {
                node.graph_id = Some(graph_id.clone());
                changes.insert("graph_id".to_owned(), Value::String(graph_id.to_string()));
            }
        }
        Entity::Edge(edge) => {
            if let Some(source) = &patch.source {
                edge.source = source.clone();
                changes.insert("source".to_owned(), Value::String(source.to_string()));
            }
            if let Some(target) = &patch.target {
                edge.target = target.clone();
                changes.insert("target".to_owned(), Value::String(target.to_string()));
            }
            if let Some(key) = &patch.key {
                edge.key = Some(key.clone());
                changes.insert("key".to_owned(), Value::String(key.clone()));
            }
            if let Some(weight) = patch.weight {
                edge.weight = Some(weight);
                changes.insert("weight".to_owned(), Value::from(weight));
            }
            if let Some(graph_id) = &patch.graph_id {
                edge.graph_id = Some(graph_id.clone());
                changes.insert("graph_id".to_owned(), Value::String(graph_id.to_string()));
            }
        }
    }

    if patch.deleted {
        changes.insert("deleted".to_owned(), Value::Bool(true));
    }
    changes
}

impl StoreAdapter for InMemoryAdapter {
    fn insert(&mut self, mut entity: Entity) -> Result<WriteOutcome> {
        let module = entity.metadata().module.clone();
        self.validate_schema(&module, entity.data_mut())?;

        let kind = entity.kind();
        let id = entity.id().clone();
        if self.contains(kind, &id) {
            return Err(Error::DuplicateId { kind, id });
        }
        if let Entity::Edge(edge) = &entity {
            self.check_edge(edge)?;
        }
        self.insert_row(entity.clone());
        Ok(WriteOutcome::Inserted(entity))
    }

    fn update(&mut self, kind: EntityKind, patch: Patch) -> Result<WriteOutcome> {
        let previous = self.get(kind, &patch.id)?;
        let mut current = previous.clone();
        let changes = apply_patch(&mut current, &patch);

        if patch.deleted {
            current.metadata_mut().mark_deleted();
        }
        current.metadata_mut().touch();

        let module = current.metadata().module.clone();
        self.validate_schema(&module, current.data_mut())?;

        if let Entity::Edge(edge) = &current {
            let endpoints_moved = patch.source.is_some() || patch.target.is_some();
            if endpoints_moved {
                self.check_edge(edge)?;
            }
        }

        self.replace_row(current.clone());
        Ok(WriteOutcome::Updated {
            current,
            previous,
            changes,
        })
    }

    fn delete(&mut self, kind: EntityKind, id: &EntityId) -> Result<WriteOutcome> {
        let previous = self
            .remove_row(kind, id)
            .ok_or_else(|| Error::EntityNotFound {
                kind,
                id: id.clone(),
            })?;
        Ok(WriteOutcome::Deleted { previous })
    }

    fn get(&self, kind: EntityKind, id: &EntityId) -> Result<Entity> {
        let entity = match kind {
            EntityKind::Graph => self.graphs.get(id).cloned().map(Entity::Graph),
            EntityKind::Node => self.nodes.get(id).cloned().map(Entity::Node),
            EntityKind::Edge => self.edges.get(id).cloned().map(Entity::Edge),
        };
        entity.ok_or_else(|| Error::EntityNotFound {
            kind,
            id: id.clone(),
        })
    }

    fn list(&self, kind: EntityKind, filter: &AttrMap) -> Vec<Entity> {
        let mut rows: Vec<Entity> = match kind {
            EntityKind::Graph => self
                .graphs
                .values()
                .map(|g| Entity::Graph(g.clone()))
                .filter(|e| e.matches_filter(filter))
                .collect(),
            EntityKind::Node => match self.indexes.plan_nodes(filter) {
                Plan::Empty => Vec::new(),
                Plan::Hit(bucket) => bucket
                    .iter()
                    .filter_map(|id| self.nodes.get(id))
                    .map(|n| Entity::Node(n.clone()))
                    .filter(|e| e.matches_filter(filter))
                    .collect(),
                Plan::Scan => self
                    .nodes
                    .values()
                    .map(|n| Entity::Node(n.clone()))
                    .filter(|e| e.matches_filter(filter))
                    .collect(),
            },
            EntityKind::Edge => match self.indexes.plan_edges(filter) {
                Plan::Empty => Vec::new(),
                Plan::Hit(bucket) => bucket
                    .iter()
                    .filter_map(|id| self.edges.get(id))
                    .map(|e| Entity::Edge(e.clone()))
                    .filter(|e| e.matches_filter(filter))
                    .collect(),
                Plan::Scan => self
                    .edges
                    .values()
                    .map(|e| Entity::Edge(e.clone()))
                    .filter(|e| e.matches_filter(filter))
                    .collect(),
            },
        };
        rows.sort_by(|a, b| a.id().cmp(b.id()));
        rows
    }

    fn commit(&mut self, tx: Transaction) -> Result<CommitReceipt> {
        if tx.is_empty() {
            return Err(Error::InvalidOperation {
                index: 0,
                reason: "transaction is empty".to_owned(),
            });
        }
        for (index, operation) in tx.operations().iter().enumerate() {
            self.prevalidate(operation)
                .map_err(|cause| Error::InvalidOperation {
                    index,
                    reason: cause.to_string(),
                })?;
        }

        let mut undo: Vec<UndoEntry> = Vec::with_capacity(tx.len());
        let mut outcomes: Vec<WriteOutcome> = Vec::with_capacity(tx.len());
        for (index, operation) in tx.into_operations().into_iter().enumerate() {
            match self.apply_operation(operation) {
                Ok((outcome, entry)) => {
                    undo.push(entry);
                    outcomes.push(outcome);
                }
                Err(cause) => {
                    tracing::debug!(index, error = %cause, "transaction failed, rolling back");
                    self.rollback(undo);
                    return Err(Error::tx_failed(index, cause));
                }
            }
        }
        Ok(CommitReceipt { outcomes })
    }

    fn clear(&mut self) {
        self.graphs.clear();
        self.nodes.clear();
        self.edges.clear();
        self.indexes.clear();
    }

    fn contains(&self, kind: EntityKind, id: &EntityId) -> bool {
        match kind {
            EntityKind::Graph => self.graphs.contains_key(id),
            EntityKind::Node => self.nodes.contains_key(id),
            EntityKind::Edge => self.edges.contains_key(id),
        }
    }

    fn node(&self, id: &EntityId) -> Option<NodeRecord> {
        self.nodes.get(id).cloned()
    }

    fn node_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.nodes.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn nodes_in_graph(&self, graph_id: &EntityId) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .indexes
            .nodes_in_graph(graph_id)
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    fn edges_from(&self, node: &EntityId, module: Option<&ModuleSymbol>) -> Vec<EdgeRecord> {
        let bucket = match module {
            Some(module) => self.indexes.edges_from_with_module(node, module),
            None => self.indexes.edges_from(node),
        };
        self.collect_edges(bucket)
    }

    fn edges_to(&self, node: &EntityId, module: Option<&ModuleSymbol>) -> Vec<EdgeRecord> {
        let bucket = match module {
            Some(module) => self.indexes.edges_to_with_module(node, module),
            None => self.indexes.edges_to(node),
        };
        self.collect_edges(bucket)
    }

    fn edges_with_module(&self, module: &ModuleSymbol) -> Vec<EdgeRecord> {
        self.collect_edges(self.indexes.edges_with_module(module))
    }

    fn all_edges(&self) -> Vec<EdgeRecord> {
        let mut edges: Vec<EdgeRecord> = self.edges.values().cloned().collect();
        edges.sort_by(|a, b| a.id.cmp(&b.id));
        edges
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn graph_count(&self) -> usize {
        self.graphs.len()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::binding::Binding;
    use crate::schema::{FieldSpec, FieldType, Schema};
    use crate::types::TypeDecl;
    use serde_json::json;

    fn registry() -> Arc<TypeRegistry> {
        let mut types = TypeRegistry::new();
        types.register(
            TypeDecl::node("person").with_schema(
                Schema::default().field(FieldSpec::required("name", FieldType::String)),
            ),
        );
        types.register(TypeDecl::node("company"));
        types.register(TypeDecl::node("city"));
        types.register(
            TypeDecl::edge("works_at")
                .with_source_binding(Binding::any().including(["person"]))
                .with_target_binding(Binding::any().including(["company"])),
        );
        Arc::new(types)
    }

    fn adapter() -> InMemoryAdapter {
        InMemoryAdapter::new(registry())
    }

    fn person(id: &str, name: &str) -> Entity {
        NodeRecord::new("person").with_id(id).attr("name", name).into()
    }

    #[test]
    fn insert_assigns_rows_and_indices_together() {
        let mut store = adapter();
        store.insert(person("p1", "ada")).unwrap();
        store
            .insert(NodeRecord::new("company").with_id("c1").into())
            .unwrap();
        store
            .insert(EdgeRecord::new("works_at", "p1", "c1").with_id("e1").into())
            .unwrap();

        assert_eq!(store.edge_count(), 1);
        assert_eq!(store.edges_from(&"p1".into(), None).len(), 1);
        assert_eq!(store.edges_to(&"c1".into(), None).len(), 1);
        assert_eq!(
            store
                .edges_with_module(&ModuleSymbol::intern("works_at"))
                .len(),
            1
        );
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut store = adapter();
        store.insert(person("p1", "ada")).unwrap();
        let err = store.insert(person("p1", "bob")).unwrap_err();
        assert!(matches!(err, Error::DuplicateId { .. }));
    }

    #[test]
    fn schema_violation_blocks_the_insert() {
        let mut store = adapter();
        let err = store
            .insert(NodeRecord::new("person").with_id("p1").into())
            .unwrap_err();
        assert!(matches!(err, Error::SchemaViolation { .. }));
        assert_eq!(store.node_count(), 0);
    }

    #[test]
    fn binding_violation_reports_the_failing_side() {
        let mut store = adapter();
        store
            .insert(NodeRecord::new("city").with_id("c1").into())
            .unwrap();
        store
            .insert(NodeRecord::new("company").with_id("co1").into())
            .unwrap();
        let err = store
            .insert(EdgeRecord::new("works_at", "c1", "co1").into())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::BindingViolation {
                side: EdgeSide::Source,
                ..
            }
        ));
        assert_eq!(store.edge_count(), 0, "no state change on violation");
    }

    #[test]
    fn edge_to_missing_node_dangles() {
        let mut store = adapter();
        store.insert(person("p1", "ada")).unwrap();
        let err = store
            .insert(EdgeRecord::new("works_at", "p1", "ghost").into())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DanglingReference {
                side: EdgeSide::Target,
                ..
            }
        ));
    }

    #[test]
    fn update_merges_data_and_bumps_version() {
        let mut store = adapter();
        store.insert(person("p1", "ada")).unwrap();
        let outcome = store
            .update(
                EntityKind::Node,
                Patch::update("p1").set("age", 36).set("name", "ada l"),
            )
            .unwrap();
        let WriteOutcome::Updated {
            current, previous, changes,
        } = outcome
        else {
            unreachable!("update must produce Updated");
        };
        assert_eq!(previous.metadata().version, 0);
        assert_eq!(current.metadata().version, 1);
        assert_eq!(current.data().get("age"), Some(&json!(36)));
        assert_eq!(current.data().get("name"), Some(&json!("ada l")));
        assert!(changes.contains_key("age"));
    }

    #[test]
    fn update_of_missing_id_is_not_found() {
        let mut store = adapter();
        let err = store
            .update(EntityKind::Node, Patch::update("missing").set("a", 1))
            .unwrap_err();
        assert!(matches!(err, Error::EntityNotFound { .. }));
    }

    #[test]
    fn delete_erases_row_and_every_index_entry() {
        let mut store = adapter();
        store.insert(person("p1", "ada")).unwrap();
        store
            .insert(NodeRecord::new("company").with_id("c1").into())
            .unwrap();
        store
            .insert(EdgeRecord::new("works_at", "p1", "c1").with_id("e1").into())
            .unwrap();

        store.delete(EntityKind::Edge, &"e1".into()).unwrap();
        assert!(store.edges_from(&"p1".into(), None).is_empty());
        assert!(store.edges_to(&"c1".into(), None).is_empty());
        assert!(store
            .edges_with_module(&ModuleSymbol::intern("works_at"))
            .is_empty());
    }

    #[test]
    fn list_filters_direct_and_data_fields() {
        let mut store = adapter();
        store.insert(person("p1", "ada")).unwrap();
        store.insert(person("p2", "bob")).unwrap();

        let mut filter = AttrMap::new();
        filter.insert("name".to_owned(), json!("ada"));
        let rows = store.list(EntityKind::Node, &filter);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id(), &"p1".into());

        assert_eq!(store.list(EntityKind::Node, &AttrMap::new()).len(), 2);
    }

    #[test]
    fn list_edges_serves_indexed_prefixes() {
        let mut store = adapter();
        store.insert(person("p1", "ada")).unwrap();
        store
            .insert(NodeRecord::new("company").with_id("c1").into())
            .unwrap();
        store
            .insert(NodeRecord::new("company").with_id("c2").into())
            .unwrap();
        store
            .insert(EdgeRecord::new("works_at", "p1", "c1").with_id("e1").into())
            .unwrap();
        store
            .insert(EdgeRecord::new("works_at", "p1", "c2").with_id("e2").into())
            .unwrap();

        let mut filter = AttrMap::new();
        filter.insert("source".to_owned(), json!("p1"));
        filter.insert("type".to_owned(), json!("works_at"));
        assert_eq!(store.list(EntityKind::Edge, &filter).len(), 2);

        filter.insert("target".to_owned(), json!("c2"));
        let rows = store.list(EntityKind::Edge, &filter);
        assert_eq!(rows.len(), 1, "residual filter still applies after the index");
        assert_eq!(rows[0].id(), &"e2".into());
    }

    #[test]
    fn failed_transaction_rolls_back_every_operation() {
        let mut store = adapter();
        store.insert(person("a", "ada")).unwrap();

        let tx = Transaction::new()
            .insert(person("b", "bob"))
            .update(EntityKind::Node, Patch::update("missing").set("x", 1));
        let err = store.commit(tx).unwrap_err();
        let Error::TransactionFailed { index, cause } = err else {
            unreachable!("commit must fail as TransactionFailed");
        };
        assert_eq!(index, 1);
        assert!(matches!(*cause, Error::EntityNotFound { .. }));

        assert!(
            store.get(EntityKind::Node, &"b".into()).is_err(),
            "inserted row must be rolled back"
        );
        let a = store.get(EntityKind::Node, &"a".into()).unwrap();
        assert_eq!(a.metadata().version, 0);
    }

    #[test]
    fn rollback_restores_pre_images_and_indices() {
        let mut store = adapter();
        store.insert(person("p1", "ada")).unwrap();
        store
            .insert(NodeRecord::new("company").with_id("c1").into())
            .unwrap();
        store
            .insert(EdgeRecord::new("works_at", "p1", "c1").with_id("e1").into())
            .unwrap();

        let tx = Transaction::new()
            .delete(EntityKind::Edge, "e1")
            .update(EntityKind::Node, Patch::update("p1").set("age", 1))
            .delete(EntityKind::Edge, "e1"); // fails: already deleted in this tx
        let err = store.commit(tx).unwrap_err();
        assert!(matches!(err, Error::TransactionFailed { index: 2, .. }));

        assert_eq!(store.edges_from(&"p1".into(), None).len(), 1, "edge restored");
        let p1 = store.get(EntityKind::Node, &"p1".into()).unwrap();
        assert_eq!(p1.metadata().version, 0, "update rolled back");
        assert!(p1.data().get("age").is_none());
    }

    #[test]
    fn transaction_sees_its_own_earlier_writes() {
        let mut store = adapter();
        let tx = Transaction::new()
            .insert(person("p1", "ada"))
            .insert(NodeRecord::new("company").with_id("c1"))
            .insert(EdgeRecord::new("works_at", "p1", "c1").with_id("e1"));
        let receipt = store.commit(tx).unwrap();
        assert_eq!(receipt.outcomes.len(), 3);
        assert_eq!(store.edge_count(), 1);
    }

    #[test]
    fn empty_transaction_is_invalid() {
        let mut store = adapter();
        let err = store.commit(Transaction::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidOperation { .. }));
    }

    #[test]
    fn schema_failures_abort_before_any_operation_runs() {
        let mut store = adapter();
        let tx = Transaction::new()
            .insert(person("ok", "ada"))
            .insert(NodeRecord::new("person").with_id("bad")); // missing name
        let err = store.commit(tx).unwrap_err();
        assert!(matches!(err, Error::InvalidOperation { index: 1, .. }));
        assert_eq!(store.node_count(), 0, "validation failures run before writes");
    }

    #[test]
    fn soft_deleted_endpoint_cannot_anchor_new_edges() {
        let mut store = adapter();
        store.insert(person("p1", "ada")).unwrap();
        store
            .insert(NodeRecord::new("company").with_id("c1").into())
            .unwrap();
        store
            .update(EntityKind::Node, Patch::update("p1").mark_deleted())
            .unwrap();
        let err = store
            .insert(EdgeRecord::new("works_at", "p1", "c1").into())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DanglingReference {
                side: EdgeSide::Source,
                ..
            }
        ));
    }
}
