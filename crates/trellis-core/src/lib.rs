// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! trellis-core: embedded, in-memory transactional property-graph store.
//!
//! The crate provides typed nodes, edges, and graphs with schema validation
//! and edge endpoint bindings, a pluggable storage adapter with a default
//! in-memory backend (structural indices, atomic transactions with undo-log
//! rollback), a process-wide registry of named stores behind a single
//! facade, and an in-process publish/subscribe event bus. Graph algorithms
//! live in the companion `trellis-algo` crate and read through
//! [`StoreView`].
//!
//! Everything stays in process memory; there is no persistence layer.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod access;
mod adapter;
mod binding;
mod bus;
mod entity;
mod error;
mod event;
mod ident;
mod memory;
mod metadata;
mod registry;
mod schema;
mod store;
mod tx;
mod types;

/// Access overlay hook contract.
pub use access::{AccessOverlay, Action, Decision, OpContext};
/// Storage adapter contract and traversal direction.
pub use adapter::{Direction, StoreAdapter};
/// Edge endpoint bindings.
pub use binding::{Binding, BindingReason, EdgeSide};
/// Subscription bus types.
pub use bus::{
    EventFilter, SubscribeOptions, Subscriber, SubscriptionBus, SubscriptionId, SubscriptionInfo,
    DEFAULT_MAILBOX_CAPACITY,
};
/// Storable records and patches.
pub use entity::{AttrMap, EdgeRecord, Entity, GraphRecord, NodeRecord, Patch};
/// Unified error taxonomy.
pub use error::{Error, Result};
/// Event records and topics.
pub use event::{Event, EventClass, EventKind, Topic};
/// Identifier types.
pub use ident::{EntityId, ModuleSymbol};
/// Default in-memory adapter.
pub use memory::InMemoryAdapter;
/// Entity kinds and metadata envelope.
pub use metadata::{EntityKind, Metadata};
/// Names of running stores.
pub use registry::store_names;
/// Field schemas.
pub use schema::{FieldSpec, FieldType, Schema};
/// Store facade, handles, and read views.
pub use store::{Store, StoreConfig, StoreHandle, StoreView};
/// Transactions, operations, and commit receipts.
pub use tx::{CommitReceipt, Operation, Transaction, WriteOutcome};
/// Type module declarations.
pub use types::{EntityType, TypeDecl, TypeRegistry};
