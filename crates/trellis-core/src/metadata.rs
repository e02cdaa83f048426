// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Entity kinds and the per-entity metadata envelope.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ident::ModuleSymbol;

/// The three storable entity kinds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum EntityKind {
    /// A logical grouping scope for nodes and edges.
    Graph,
    /// A vertex carrying an attribute map.
    Node,
    /// A directed connection between two nodes.
    Edge,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Graph => f.write_str("graph"),
            Self::Node => f.write_str("node"),
            Self::Edge => f.write_str("edge"),
        }
    }
}

/// Store-managed metadata attached to every entity.
///
/// # Invariants
/// - `version` starts at 0 on insert and strictly increases on each
///   successful update of the same id.
/// - `updated_at >= created_at` at every observable point.
/// - `deleted` mirrors `deleted_at.is_some()`. The in-memory adapter
///   hard-deletes; these fields exist so an upper layer (or a persistent
///   adapter) can soft-delete through a normal update without changing
///   callers.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Metadata {
    /// Which table the entity lives in.
    pub entity_kind: EntityKind,
    /// Type module that created the entity; referenced by bindings.
    pub module: ModuleSymbol,
    /// Set by the store on insert.
    pub created_at: DateTime<Utc>,
    /// Refreshed by the store on every successful update.
    pub updated_at: DateTime<Utc>,
    /// Set when the entity is soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Monotonically increasing update counter, 0 on insert.
    pub version: u64,
    /// Mirror of `deleted_at.is_some()`.
    pub deleted: bool,
}

impl Metadata {
    /// Stamps fresh metadata for a newly constructed entity.
    #[must_use]
    pub fn new(entity_kind: EntityKind, module: ModuleSymbol) -> Self {
        let now = Utc::now();
        Self {
            entity_kind,
            module,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            version: 0,
            deleted: false,
        }
    }

    /// Bumps the version and refreshes `updated_at`.
    pub fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }

    /// Marks the entity soft-deleted.
    pub fn mark_deleted(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.deleted = true;
        self.updated_at = now;
    }

    /// Returns `true` when the entity has not been soft-deleted.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.deleted
    }
}
