// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Process-wide registry of named, running stores.
//!
//! The registry itself is the only static state in the crate; entries are
//! created and destroyed explicitly through `Store::start`/`Store::stop`.
//! Its lock guards only registration, lookup, and removal — store
//! operations run entirely under the store's own locks.
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::store::StoreShared;

static REGISTRY: Lazy<RwLock<FxHashMap<String, Arc<StoreShared>>>> =
    Lazy::new(|| RwLock::new(FxHashMap::default()));

/// Registers a started store under a unique name.
pub(crate) fn register(name: &str, shared: Arc<StoreShared>) -> Result<()> {
    let mut registry = REGISTRY.write();
    if registry.contains_key(name) {
        return Err(Error::StoreAlreadyStarted {
            name: name.to_owned(),
        });
    }
    registry.insert(name.to_owned(), shared);
    Ok(())
}

/// Removes a store from the registry, returning its shared state for
/// teardown.
pub(crate) fn unregister(name: &str) -> Result<Arc<StoreShared>> {
    REGISTRY
        .write()
        .remove(name)
        .ok_or_else(|| Error::StoreNotFound {
            name: name.to_owned(),
        })
}

/// Looks up a running store by name.
pub(crate) fn lookup(name: &str) -> Result<Arc<StoreShared>> {
    REGISTRY
        .read()
        .get(name)
        .cloned()
        .ok_or_else(|| Error::StoreNotFound {
            name: name.to_owned(),
        })
}

/// Names of every running store, sorted.
#[must_use]
pub fn store_names() -> Vec<String> {
    let mut names: Vec<String> = REGISTRY.read().keys().cloned().collect();
    names.sort();
    names
}
