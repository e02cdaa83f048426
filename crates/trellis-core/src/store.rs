// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The store facade: the single public entry point over named stores.
//!
//! Every operation routes to a named store's shared state: one writer lock
//! over the adapter (tables plus indices), a subscription bus, and an
//! optional access overlay. Writes serialize through the lock and publish
//! their events only after the lock is released, so a reader admitted after
//! a commit observes the commit in full and subscribers see events in
//! commit order.
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::access::{AccessOverlay, Action, Decision, OpContext};
use crate::adapter::StoreAdapter;
use crate::bus::{SubscribeOptions, Subscriber, SubscriptionBus, SubscriptionId, SubscriptionInfo};
use crate::entity::{AttrMap, EdgeRecord, Entity, NodeRecord, Patch};
use crate::error::{Error, Result};
use crate::event::{Event, Topic};
use crate::ident::{EntityId, ModuleSymbol};
use crate::memory::InMemoryAdapter;
use crate::metadata::EntityKind;
use crate::registry;
use crate::tx::{CommitReceipt, Operation, Transaction};
use crate::types::TypeRegistry;

/// Configuration accepted by [`Store::start`].
pub struct StoreConfig {
    /// Type declarations the default adapter validates against.
    pub types: TypeRegistry,
    /// Adapter override; defaults to [`InMemoryAdapter`] over `types`.
    pub adapter: Option<Box<dyn StoreAdapter>>,
    /// Optional access-control overlay.
    pub overlay: Option<Arc<dyn AccessOverlay>>,
    /// Default mailbox bound for subscriptions on this store.
    pub mailbox_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            types: TypeRegistry::new(),
            adapter: None,
            overlay: None,
            mailbox_capacity: crate::bus::DEFAULT_MAILBOX_CAPACITY,
        }
    }
}

impl StoreConfig {
    /// Sets the type declarations.
    #[must_use]
    pub fn with_types(mut self, types: TypeRegistry) -> Self {
        self.types = types;
        self
    }

    /// Plugs in a custom adapter. A custom adapter owns its own validation
    /// state; `types` is ignored for it.
    #[must_use]
    pub fn with_adapter(mut self, adapter: Box<dyn StoreAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Attaches an access overlay.
    #[must_use]
    pub fn with_overlay(mut self, overlay: Arc<dyn AccessOverlay>) -> Self {
        self.overlay = Some(overlay);
        self
    }

    /// Overrides the default subscription mailbox bound.
    #[must_use]
    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("types", &self.types.len())
            .field("adapter", &self.adapter.as_ref().map(|_| "<custom>"))
            .field("overlay", &self.overlay.as_ref().map(|_| "<overlay>"))
            .field("mailbox_capacity", &self.mailbox_capacity)
            .finish()
    }
}

/// Shared state of one running store.
pub(crate) struct StoreShared {
    name: String,
    adapter: RwLock<Box<dyn StoreAdapter>>,
    bus: SubscriptionBus,
    overlay: Option<Arc<dyn AccessOverlay>>,
    mailbox_capacity: usize,
}

impl StoreShared {
    pub(crate) fn close(&self) {
        self.bus.close();
        self.adapter.write().close();
    }
}

/// Cloneable handle to one running store.
///
/// A handle may be scoped to an actor with [`StoreHandle::as_actor`]; the
/// actor id is carried into overlay hook contexts and nowhere else.
#[derive(Clone)]
pub struct StoreHandle {
    shared: Arc<StoreShared>,
    actor: Option<Arc<str>>,
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("store", &self.shared.name)
            .field("actor", &self.actor)
            .finish_non_exhaustive()
    }
}

/// Read-only view over a store, held under the store's read lock.
///
/// The view exposes only query methods, so algorithms and other consumers
/// cannot mutate state or publish events through it. Holding a view blocks
/// writers; drop it promptly.
pub struct StoreView<'a> {
    guard: RwLockReadGuard<'a, Box<dyn StoreAdapter>>,
}

impl StoreView<'_> {
    /// Looks up one entity by id.
    pub fn get(&self, kind: EntityKind, id: &EntityId) -> Result<Entity> {
        self.guard.get(kind, id)
    }

    /// Returns every entity of `kind` matching `filter`, sorted by id.
    #[must_use]
    pub fn list(&self, kind: EntityKind, filter: &AttrMap) -> Vec<Entity> {
        self.guard.list(kind, filter)
    }

    /// Returns `true` when an entity exists in `kind`'s table.
    #[must_use]
    pub fn contains(&self, kind: EntityKind, id: &EntityId) -> bool {
        self.guard.contains(kind, id)
    }

    /// Looks up one node record.
    #[must_use]
    pub fn node(&self, id: &EntityId) -> Option<NodeRecord> {
        self.guard.node(id)
    }

    /// Every node id, sorted.
    #[must_use]
    pub fn node_ids(&self) -> Vec<EntityId> {
        self.guard.node_ids()
    }

    /// Node ids parented under `graph_id`, sorted.
    #[must_use]
    pub fn nodes_in_graph(&self, graph_id: &EntityId) -> Vec<EntityId> {
        self.guard.nodes_in_graph(graph_id)
    }

    /// Edges whose source is `node`, sorted by id.
    #[must_use]
    pub fn edges_from(&self, node: &EntityId, module: Option<&ModuleSymbol>) -> Vec<EdgeRecord> {
        self.guard.edges_from(node, module)
    }

    /// Edges whose target is `node`, sorted by id.
    #[must_use]
    pub fn edges_to(&self, node: &EntityId, module: Option<&ModuleSymbol>) -> Vec<EdgeRecord> {
        self.guard.edges_to(node, module)
    }

    /// Every edge of one module, sorted by id.
    #[must_use]
    pub fn edges_with_module(&self, module: &ModuleSymbol) -> Vec<EdgeRecord> {
        self.guard.edges_with_module(module)
    }

    /// Every edge, sorted by id.
    #[must_use]
    pub fn all_edges(&self) -> Vec<EdgeRecord> {
        self.guard.all_edges()
    }

    /// Number of stored nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.guard.node_count()
    }

    /// Number of stored edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.guard.edge_count()
    }

    /// Number of stored graphs.
    #[must_use]
    pub fn graph_count(&self) -> usize {
        self.guard.graph_count()
    }
}

impl StoreHandle {
    /// The store's registered name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Returns a handle scoped to `actor` for overlay hook contexts.
    #[must_use]
    pub fn as_actor(&self, actor: impl Into<String>) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            actor: Some(Arc::from(actor.into())),
        }
    }

    fn context(
        &self,
        action: Action,
        kind: Option<EntityKind>,
        entity_id: Option<EntityId>,
    ) -> OpContext {
        OpContext {
            actor_id: self.actor.as_ref().map(ToString::to_string),
            kind,
            entity_id,
            action,
        }
    }

    /// Runs the overlay pre-hook for one operation.
    ///
    /// Public so derived computations (the algorithm crate's dispatcher)
    /// can gate on [`Action::Execute`] without the overlay type leaking.
    pub fn authorize(
        &self,
        action: Action,
        kind: Option<EntityKind>,
        entity_id: Option<EntityId>,
        operation: &str,
    ) -> Result<()> {
        let Some(overlay) = &self.shared.overlay else {
            return Ok(());
        };
        match overlay.before(&self.context(action, kind, entity_id)) {
            Decision::Allow => Ok(()),
            Decision::Deny { reason } => {
                tracing::debug!(
                    store = %self.shared.name,
                    operation,
                    reason,
                    "overlay denied operation"
                );
                Err(Error::Unauthorized {
                    operation: operation.to_owned(),
                })
            }
        }
    }

    fn filter_read(&self, records: Vec<Entity>, action: Action, ctx: &OpContext) -> Vec<Entity> {
        if let Some(overlay) = &self.shared.overlay {
            overlay.filter(records, action, ctx)
        } else {
            records
        }
    }

    fn write_guard(
        &self,
        timeout: Option<Duration>,
    ) -> Result<RwLockWriteGuard<'_, Box<dyn StoreAdapter>>> {
        match timeout {
            None => Ok(self.shared.adapter.write()),
            Some(waited) => self
                .shared
                .adapter
                .try_write_for(waited)
                .ok_or(Error::Timeout { waited }),
        }
    }

    /// Takes a read-only view under the store's read lock.
    #[must_use]
    pub fn view(&self) -> StoreView<'_> {
        StoreView {
            guard: self.shared.adapter.read(),
        }
    }

    /// Like [`StoreHandle::view`], but gives up after `timeout`.
    pub fn view_timeout(&self, timeout: Duration) -> Result<StoreView<'_>> {
        self.shared
            .adapter
            .try_read_for(timeout)
            .map(|guard| StoreView { guard })
            .ok_or(Error::Timeout { waited: timeout })
    }

    /// Inserts an entity, filling store-managed metadata, and publishes the
    /// `Created` event after the write is fully applied.
    pub fn insert(&self, entity: impl Into<Entity>) -> Result<Entity> {
        let entity = entity.into();
        self.authorize(
            Action::Write,
            Some(entity.kind()),
            Some(entity.id().clone()),
            "insert",
        )?;
        tracing::debug!(store = %self.shared.name, kind = %entity.kind(), id = %entity.id(), "insert");
        let outcome = self.write_guard(None)?.insert(entity)?;
        let record = outcome.record().clone();
        self.shared.bus.publish(&outcome.into_event());
        Ok(record)
    }

    /// Applies a partial update and publishes the `Updated` event.
    pub fn update(&self, kind: EntityKind, patch: Patch) -> Result<Entity> {
        self.authorize(Action::Write, Some(kind), Some(patch.id.clone()), "update")?;
        tracing::debug!(store = %self.shared.name, %kind, id = %patch.id, "update");
        let outcome = self.write_guard(None)?.update(kind, patch)?;
        let record = outcome.record().clone();
        self.shared.bus.publish(&outcome.into_event());
        Ok(record)
    }

    /// Deletes an entity and publishes the `Deleted` event.
    pub fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<()> {
        self.authorize(Action::Destroy, Some(kind), Some(id.clone()), "delete")?;
        tracing::debug!(store = %self.shared.name, %kind, %id, "delete");
        let outcome = self.write_guard(None)?.delete(kind, id)?;
        self.shared.bus.publish(&outcome.into_event());
        Ok(())
    }

    /// Looks up one entity, subject to the overlay's read filter.
    pub fn get(&self, kind: EntityKind, id: &EntityId) -> Result<Entity> {
        let ctx = self.context(Action::Read, Some(kind), Some(id.clone()));
        self.authorize(Action::Read, Some(kind), Some(id.clone()), "get")?;
        let entity = self.view().get(kind, id)?;
        self.filter_read(vec![entity], Action::Read, &ctx)
            .pop()
            .ok_or_else(|| Error::EntityNotFound {
                kind,
                id: id.clone(),
            })
    }

    /// Filtered scan, subject to the overlay's read filter.
    pub fn list(&self, kind: EntityKind, filter: &AttrMap) -> Result<Vec<Entity>> {
        let ctx = self.context(Action::Read, Some(kind), None);
        self.authorize(Action::Read, Some(kind), None, "list")?;
        let rows = self.view().list(kind, filter);
        Ok(self.filter_read(rows, Action::Read, &ctx))
    }

    /// Commits a transaction atomically and publishes one event per write,
    /// in commit order, after every write is applied with its indices.
    pub fn commit(&self, tx: Transaction) -> Result<CommitReceipt> {
        self.commit_inner(tx, None)
    }

    /// Like [`StoreHandle::commit`], but returns [`Error::Timeout`] without
    /// side effects when the writer lock is not acquired in time. Once the
    /// lock is held the transaction runs to completion.
    pub fn commit_timeout(&self, tx: Transaction, timeout: Duration) -> Result<CommitReceipt> {
        self.commit_inner(tx, Some(timeout))
    }

    fn commit_inner(&self, tx: Transaction, timeout: Option<Duration>) -> Result<CommitReceipt> {
        for operation in tx.operations() {
            let (action, kind, id, name) = match operation {
                Operation::Insert { entity } => (
                    Action::Write,
                    Some(entity.kind()),
                    Some(entity.id().clone()),
                    "insert",
                ),
                Operation::Update { kind, patch } => {
                    (Action::Write, Some(*kind), Some(patch.id.clone()), "update")
                }
                Operation::Delete { kind, id } => {
                    (Action::Destroy, Some(*kind), Some(id.clone()), "delete")
                }
            };
            self.authorize(action, kind, id, name)?;
        }

        tracing::debug!(store = %self.shared.name, operations = tx.len(), "commit");
        let receipt = self.write_guard(timeout)?.commit(tx)?;
        for event in receipt.clone().into_events() {
            self.shared.bus.publish(&event);
        }
        Ok(receipt)
    }

    /// Registers a subscription on this store's bus.
    #[must_use]
    pub fn subscribe(&self, topic: Topic, opts: SubscribeOptions) -> (SubscriptionId, Subscriber) {
        let opts = SubscribeOptions {
            mailbox_capacity: opts.mailbox_capacity.or(Some(self.shared.mailbox_capacity)),
            ..opts
        };
        self.shared.bus.subscribe(topic, opts)
    }

    /// Removes a subscription. Returns `true` when one was removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.bus.unsubscribe(id)
    }

    /// Publishes a caller-built (custom) event.
    pub fn publish(&self, event: &Event) -> usize {
        self.shared.bus.publish(event)
    }

    /// Lists live subscriptions with their drop counters.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<SubscriptionInfo> {
        self.shared.bus.list()
    }

    /// Drops every row and index, keeping the store running.
    pub fn clear(&self) -> Result<()> {
        self.authorize(Action::Destroy, None, None, "clear")?;
        self.write_guard(None)?.clear();
        Ok(())
    }
}

/// Facade over the process-wide registry of named stores.
///
/// All functions route by store name; [`Store::handle`] returns a cloneable
/// [`StoreHandle`] that skips the registry lookup on hot paths.
#[derive(Debug)]
pub struct Store;

impl Store {
    /// Starts a store: builds the adapter, registers the name, and returns
    /// a handle.
    pub fn start(name: impl Into<String>, config: StoreConfig) -> Result<StoreHandle> {
        let name = name.into();
        let adapter = match config.adapter {
            Some(adapter) => adapter,
            None => Box::new(InMemoryAdapter::new(Arc::new(config.types))),
        };
        let shared = Arc::new(StoreShared {
            name: name.clone(),
            adapter: RwLock::new(adapter),
            bus: SubscriptionBus::new(),
            overlay: config.overlay,
            mailbox_capacity: config.mailbox_capacity,
        });
        registry::register(&name, Arc::clone(&shared))?;
        tracing::info!(store = %name, "store started");
        Ok(StoreHandle {
            shared,
            actor: None,
        })
    }

    /// Stops a store: unregisters the name, closes the bus, and releases
    /// adapter resources. Existing handles keep the state alive but the
    /// name becomes reusable immediately.
    pub fn stop(name: &str) -> Result<()> {
        let shared = registry::unregister(name)?;
        shared.close();
        tracing::info!(store = %name, "store stopped");
        Ok(())
    }

    /// Returns a handle to a running store.
    pub fn handle(name: &str) -> Result<StoreHandle> {
        Ok(StoreHandle {
            shared: registry::lookup(name)?,
            actor: None,
        })
    }

    /// Inserts an entity into the named store.
    pub fn insert(name: &str, entity: impl Into<Entity>) -> Result<Entity> {
        Self::handle(name)?.insert(entity)
    }

    /// Applies a partial update in the named store.
    pub fn update(name: &str, kind: EntityKind, patch: Patch) -> Result<Entity> {
        Self::handle(name)?.update(kind, patch)
    }

    /// Deletes an entity from the named store.
    pub fn delete(name: &str, kind: EntityKind, id: &EntityId) -> Result<()> {
        Self::handle(name)?.delete(kind, id)
    }

    /// Looks up one entity in the named store.
    pub fn get(name: &str, kind: EntityKind, id: &EntityId) -> Result<Entity> {
        Self::handle(name)?.get(kind, id)
    }

    /// Filtered scan over the named store.
    pub fn list(name: &str, kind: EntityKind, filter: &AttrMap) -> Result<Vec<Entity>> {
        Self::handle(name)?.list(kind, filter)
    }

    /// Commits a transaction against the named store.
    pub fn commit(name: &str, tx: Transaction) -> Result<CommitReceipt> {
        Self::handle(name)?.commit(tx)
    }

    /// Registers a subscription on the named store.
    pub fn subscribe(
        name: &str,
        topic: Topic,
        opts: SubscribeOptions,
    ) -> Result<(SubscriptionId, Subscriber)> {
        Ok(Self::handle(name)?.subscribe(topic, opts))
    }

    /// Removes a subscription from the named store.
    pub fn unsubscribe(name: &str, id: SubscriptionId) -> Result<bool> {
        Ok(Self::handle(name)?.unsubscribe(id))
    }

    /// Publishes a custom event on the named store.
    pub fn publish(name: &str, event: &Event) -> Result<usize> {
        Ok(Self::handle(name)?.publish(event))
    }

    /// Lists live subscriptions on the named store.
    pub fn subscriptions(name: &str) -> Result<Vec<SubscriptionInfo>> {
        Ok(Self::handle(name)?.subscriptions())
    }
}
