// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Transactions: ordered operation batches committed atomically.
use serde::{Deserialize, Serialize};

use crate::entity::{AttrMap, Entity, Patch};
use crate::event::Event;
use crate::ident::EntityId;
use crate::metadata::EntityKind;

/// One operation inside a [`Transaction`].
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Insert a fully constructed entity.
    Insert {
        /// The entity to store.
        entity: Entity,
    },
    /// Apply a partial update to an existing entity.
    Update {
        /// Table the patch targets.
        kind: EntityKind,
        /// The partial update.
        patch: Patch,
    },
    /// Remove an entity by id.
    Delete {
        /// Table the id lives in.
        kind: EntityKind,
        /// Id of the entity to remove.
        id: EntityId,
    },
}

/// Ordered, non-empty batch of operations committed atomically.
///
/// Operations execute in order; any failure rolls the store back to its
/// pre-transaction state. Later operations observe the effects of earlier
/// ones, so inserting a node and an edge referencing it in one transaction
/// is legal.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Transaction {
    operations: Vec<Operation>,
}

impl Transaction {
    /// Creates an empty transaction. `commit` rejects it until an
    /// operation is added.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an insert.
    #[must_use]
    pub fn insert(mut self, entity: impl Into<Entity>) -> Self {
        self.operations.push(Operation::Insert {
            entity: entity.into(),
        });
        self
    }

    /// Appends an update.
    #[must_use]
    pub fn update(mut self, kind: EntityKind, patch: Patch) -> Self {
        self.operations.push(Operation::Update { kind, patch });
        self
    }

    /// Appends a delete.
    #[must_use]
    pub fn delete(mut self, kind: EntityKind, id: impl Into<EntityId>) -> Self {
        self.operations.push(Operation::Delete {
            kind,
            id: id.into(),
        });
        self
    }

    /// Appends an already-built operation.
    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    /// The operations in commit order.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` when the transaction holds no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Consumes the transaction into its operations.
    #[must_use]
    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }
}

/// Effect of one committed write, as recorded in a [`CommitReceipt`].
#[derive(Clone, PartialEq, Debug)]
pub enum WriteOutcome {
    /// A row was inserted.
    Inserted(Entity),
    /// A row was updated in place.
    Updated {
        /// Post-update record.
        current: Entity,
        /// Pre-update record.
        previous: Entity,
        /// The fields the patch changed.
        changes: AttrMap,
    },
    /// A row was removed.
    Deleted {
        /// The removed record's last image.
        previous: Entity,
    },
}

impl WriteOutcome {
    /// Returns the record a caller most likely wants back: the current
    /// image for inserts/updates, the last image for deletes.
    #[must_use]
    pub fn record(&self) -> &Entity {
        match self {
            Self::Inserted(entity) | Self::Updated { current: entity, .. } => entity,
            Self::Deleted { previous } => previous,
        }
    }

    /// Converts the outcome into the event the store publishes for it.
    #[must_use]
    pub fn into_event(self) -> Event {
        match self {
            Self::Inserted(entity) => Event::created(entity),
            Self::Updated {
                current,
                previous,
                changes,
            } => Event::updated(current, previous, changes),
            Self::Deleted { previous } => Event::deleted(previous),
        }
    }
}

/// Result of a committed transaction: one outcome per operation, in commit
/// order. Events derived from the receipt are published after every write
/// is applied with its indices updated.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct CommitReceipt {
    /// Per-operation outcomes in commit order.
    pub outcomes: Vec<WriteOutcome>,
}

impl CommitReceipt {
    /// The committed records in commit order.
    #[must_use]
    pub fn records(&self) -> Vec<&Entity> {
        self.outcomes.iter().map(WriteOutcome::record).collect()
    }

    /// Converts the receipt into publishable events, in commit order.
    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        self.outcomes
            .into_iter()
            .map(WriteOutcome::into_event)
            .collect()
    }
}
