// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Identifier types: opaque entity ids and interned module symbols.
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque identifier for a stored entity.
///
/// Ids are plain strings. Callers may supply their own; when omitted the
/// store assigns a UUIDv7 via [`EntityId::generate`], which is time-ordered
/// and lexicographically sortable, so sorting rows by id approximates
/// insertion order. Uniqueness is scoped per entity kind per store.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wraps a caller-supplied identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh time-ordered identifier (UUIDv7).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().simple().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Process-wide intern table for [`ModuleSymbol`].
static SYMBOLS: Lazy<Mutex<FxHashSet<Arc<str>>>> =
    Lazy::new(|| Mutex::new(FxHashSet::default()));

/// Interned symbol naming the type module that created an entity.
///
/// Symbols are what bindings reference: edge-type constraints are set
/// membership over `ModuleSymbol`, never over concrete Rust types. Interning
/// makes clones and equality checks cheap on index hot paths; two symbols
/// created from the same name share one allocation.
#[derive(Clone, Debug)]
pub struct ModuleSymbol(Arc<str>);

impl ModuleSymbol {
    /// Interns `name` and returns the shared symbol.
    #[must_use]
    pub fn intern(name: &str) -> Self {
        let mut table = SYMBOLS.lock();
        if let Some(existing) = table.get(name) {
            return Self(Arc::clone(existing));
        }
        let entry: Arc<str> = Arc::from(name);
        table.insert(Arc::clone(&entry));
        Self(entry)
    }

    /// Returns the symbol name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for ModuleSymbol {
    fn eq(&self, other: &Self) -> bool {
        // Interned symbols with equal names share one allocation.
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for ModuleSymbol {}

impl PartialOrd for ModuleSymbol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModuleSymbol {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl std::hash::Hash for ModuleSymbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Display for ModuleSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleSymbol {
    fn from(value: &str) -> Self {
        Self::intern(value)
    }
}

impl Serialize for ModuleSymbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ModuleSymbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::intern(&name))
    }
}
