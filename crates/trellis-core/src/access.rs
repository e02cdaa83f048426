// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Access-control overlay hook contract.
//!
//! The overlay itself is an external collaborator; the store only exposes
//! two hook points and treats the implementation as opaque. No overlay
//! types leak into records, adapters, or events.
use crate::entity::Entity;
use crate::ident::EntityId;
use crate::metadata::EntityKind;

/// The intended action an operation performs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Action {
    /// Read one or more records.
    Read,
    /// Insert or update a record.
    Write,
    /// Delete a record.
    Destroy,
    /// Run an algorithm or other derived computation.
    Execute,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
            Self::Destroy => f.write_str("destroy"),
            Self::Execute => f.write_str("execute"),
        }
    }
}

/// Context handed to overlay hooks for one operation.
#[derive(Clone, Debug)]
pub struct OpContext {
    /// Caller identity, when the handle was scoped with one.
    pub actor_id: Option<String>,
    /// Entity kind the operation targets, when known.
    pub kind: Option<EntityKind>,
    /// Entity id the operation targets, when known.
    pub entity_id: Option<EntityId>,
    /// The intended action.
    pub action: Action,
}

/// Outcome of the pre-operation hook.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Decision {
    /// Let the operation proceed.
    Allow,
    /// Abort the operation with `Unauthorized`.
    Deny {
        /// Reason recorded in logs; not exposed to the denied caller.
        reason: String,
    },
}

/// Hook surface a store invokes when configured with an overlay.
pub trait AccessOverlay: Send + Sync {
    /// Invoked synchronously before each operation (including before each
    /// operation inside a transaction). Any [`Decision::Deny`] aborts with
    /// `Unauthorized`.
    fn before(&self, op: &OpContext) -> Decision;

    /// Invoked after a read to remove records the caller may not see.
    ///
    /// The default keeps everything.
    fn filter(&self, records: Vec<Entity>, _action: Action, _op: &OpContext) -> Vec<Entity> {
        records
    }
}
