// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Unified error taxonomy for the store, its adapters, and the algorithms.
use std::time::Duration;

use thiserror::Error;

use crate::binding::{BindingReason, EdgeSide};
use crate::ident::{EntityId, ModuleSymbol};
use crate::metadata::EntityKind;

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by store operations.
///
/// Every failure is a typed result; the store never aborts the process.
/// Validation failures are recoverable by the caller. Subscriber delivery
/// failures never appear here — they surface only through per-subscription
/// drop counters.
#[derive(Debug, Error)]
pub enum Error {
    /// The entity's `data` map failed its type module's schema.
    #[error("schema violation on field `{field}`: {reason}")]
    SchemaViolation {
        /// Offending field (dotted path for nested maps).
        field: String,
        /// What the schema expected.
        reason: String,
    },

    /// An edge endpoint's module failed the edge type's binding.
    #[error("binding violation: {side} module `{module}` is {reason}")]
    BindingViolation {
        /// Which endpoint failed.
        side: EdgeSide,
        /// The endpoint node's module.
        module: ModuleSymbol,
        /// Why the binding rejected it.
        reason: BindingReason,
    },

    /// A transaction operation failed pre-commit validation.
    #[error("invalid operation at index {index}: {reason}")]
    InvalidOperation {
        /// Zero-based operation index within the transaction.
        index: usize,
        /// What was wrong with the operation.
        reason: String,
    },

    /// No entity with the given id exists in the kind's table.
    #[error("{kind} not found: {id}")]
    EntityNotFound {
        /// Table that was searched.
        kind: EntityKind,
        /// The missing id.
        id: EntityId,
    },

    /// An insert reused an id already present in the kind's table.
    #[error("duplicate {kind} id: {id}")]
    DuplicateId {
        /// Table the collision happened in.
        kind: EntityKind,
        /// The colliding id.
        id: EntityId,
    },

    /// An edge endpoint referenced a missing or soft-deleted node at
    /// insert/update time.
    #[error("edge {side} references missing node: {id}")]
    DanglingReference {
        /// Which endpoint dangled.
        side: EdgeSide,
        /// The unresolvable node id.
        id: EntityId,
    },

    /// The access overlay denied the operation.
    #[error("unauthorized operation: {operation}")]
    Unauthorized {
        /// The denied operation, as shown to the caller.
        operation: String,
    },

    /// No path exists between the endpoints under the traversal options.
    #[error("no path from {from} to {target}")]
    NoPath {
        /// Path source node id.
        from: EntityId,
        /// Path target node id.
        target: EntityId,
    },

    /// The algorithm requires a non-empty node set.
    #[error("graph has no nodes")]
    GraphEmpty,

    /// The writer (or reader) lock was not acquired within the deadline.
    ///
    /// Timing out before lock acquisition has no side effects.
    #[error("timed out after {waited:?} waiting for the store lock")]
    Timeout {
        /// How long the caller waited.
        waited: Duration,
    },

    /// No store is registered under the given name.
    #[error("store not found: {name}")]
    StoreNotFound {
        /// The name that missed.
        name: String,
    },

    /// `start` was called with a name that is already registered.
    #[error("store already started: {name}")]
    StoreAlreadyStarted {
        /// The colliding name.
        name: String,
    },

    /// A transaction failed mid-sequence and was rolled back.
    ///
    /// The store is left in its pre-transaction state. Always carries the
    /// underlying cause.
    #[error("transaction failed at operation {index}: {cause}")]
    TransactionFailed {
        /// Zero-based index of the failing operation.
        index: usize,
        /// The error the operation produced.
        #[source]
        cause: Box<Error>,
    },

    /// An invariant was violated inside the store or an algorithm panicked
    /// at the traversal boundary.
    #[error("internal error: {details}")]
    Internal {
        /// Human-readable description.
        details: String,
    },
}

impl Error {
    /// Wraps `cause` as a [`Error::TransactionFailed`] at `index`.
    #[must_use]
    pub fn tx_failed(index: usize, cause: Self) -> Self {
        Self::TransactionFailed {
            index,
            cause: Box::new(cause),
        }
    }
}
