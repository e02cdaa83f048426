// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Event records and subscription topics.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{AttrMap, Entity};
use crate::ident::EntityId;
use crate::metadata::EntityKind;

/// What happened to produce an event.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum EventKind {
    /// An entity was inserted.
    Created,
    /// An entity was updated.
    Updated,
    /// An entity was deleted.
    Deleted,
    /// A caller-published event on a string channel.
    Custom(String),
}

/// Kind class used by subscription event masks.
///
/// Custom events collapse to one class regardless of their label, so a mask
/// stays a small set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum EventClass {
    /// Matches [`EventKind::Created`].
    Created,
    /// Matches [`EventKind::Updated`].
    Updated,
    /// Matches [`EventKind::Deleted`].
    Deleted,
    /// Matches any [`EventKind::Custom`].
    Custom,
}

impl EventKind {
    /// Returns the class used by subscription masks.
    #[must_use]
    pub fn class(&self) -> EventClass {
        match self {
            Self::Created => EventClass::Created,
            Self::Updated => EventClass::Updated,
            Self::Deleted => EventClass::Deleted,
            Self::Custom(_) => EventClass::Custom,
        }
    }
}

/// Subscription addressing tag.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Topic {
    /// Matches every mutation event of one entity kind.
    Kind(EntityKind),
    /// Matches mutation events for one specific entity.
    Entity(EntityKind, EntityId),
    /// Matches custom events published on a named channel.
    Channel(String),
}

impl Topic {
    /// Addresses one specific entity.
    #[must_use]
    pub fn entity(kind: EntityKind, id: impl Into<EntityId>) -> Self {
        Self::Entity(kind, id.into())
    }

    /// Addresses a custom channel by name.
    #[must_use]
    pub fn channel(name: impl Into<String>) -> Self {
        Self::Channel(name.into())
    }

    /// Returns `true` when this topic selects `event`.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Self::Kind(kind) => event.entity_kind == Some(*kind),
            Self::Entity(kind, id) => {
                event.entity_kind == Some(*kind) && event.entity_id.as_ref() == Some(id)
            }
            Self::Channel(name) => event.channel.as_deref() == Some(name.as_str()),
        }
    }
}

/// A store event: one mutation or one custom publication.
///
/// Mutation events are emitted by the store after a write is fully applied
/// (row and indices); events for a committed transaction are published in
/// commit order.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// Table the entity lives in; `None` for custom events without a subject.
    pub entity_kind: Option<EntityKind>,
    /// Id of the affected entity, when there is one.
    pub entity_id: Option<EntityId>,
    /// Post-write record; `None` on delete and for custom events.
    pub entity: Option<Entity>,
    /// Pre-write record; `None` on insert and for custom events.
    pub previous: Option<Entity>,
    /// The fields an update changed (patch data plus moved direct fields).
    pub changes: AttrMap,
    /// Channel name for custom events.
    pub channel: Option<String>,
    /// When the event was produced.
    pub timestamp: DateTime<Utc>,
    /// Open metadata for wire adapters.
    pub metadata: AttrMap,
}

impl Event {
    /// Builds a `Created` event from a freshly inserted entity.
    #[must_use]
    pub fn created(entity: Entity) -> Self {
        Self {
            kind: EventKind::Created,
            entity_kind: Some(entity.kind()),
            entity_id: Some(entity.id().clone()),
            entity: Some(entity),
            previous: None,
            changes: AttrMap::new(),
            channel: None,
            timestamp: Utc::now(),
            metadata: AttrMap::new(),
        }
    }

    /// Builds an `Updated` event from the post/pre images and the change set.
    #[must_use]
    pub fn updated(entity: Entity, previous: Entity, changes: AttrMap) -> Self {
        Self {
            kind: EventKind::Updated,
            entity_kind: Some(entity.kind()),
            entity_id: Some(entity.id().clone()),
            entity: Some(entity),
            previous: Some(previous),
            changes,
            channel: None,
            timestamp: Utc::now(),
            metadata: AttrMap::new(),
        }
    }

    /// Builds a `Deleted` event from the removed entity's last image.
    #[must_use]
    pub fn deleted(previous: Entity) -> Self {
        Self {
            kind: EventKind::Deleted,
            entity_kind: Some(previous.kind()),
            entity_id: Some(previous.id().clone()),
            entity: None,
            previous: Some(previous),
            changes: AttrMap::new(),
            channel: None,
            timestamp: Utc::now(),
            metadata: AttrMap::new(),
        }
    }

    /// Builds a custom event on a named channel.
    #[must_use]
    pub fn custom(channel: impl Into<String>, label: impl Into<String>, metadata: AttrMap) -> Self {
        Self {
            kind: EventKind::Custom(label.into()),
            entity_kind: None,
            entity_id: None,
            entity: None,
            previous: None,
            changes: AttrMap::new(),
            channel: Some(channel.into()),
            timestamp: Utc::now(),
            metadata,
        }
    }
}
