// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Edge endpoint bindings: per-edge-type module constraints.
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::ident::ModuleSymbol;

/// Which endpoint of an edge a check refers to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum EdgeSide {
    /// The edge's source endpoint.
    Source,
    /// The edge's target endpoint.
    Target,
}

impl std::fmt::Display for EdgeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

/// Why a module failed a binding check.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum BindingReason {
    /// The binding has a non-empty include set and the module is not in it.
    NotIncluded,
    /// The module is in the binding's exclude set.
    Excluded,
}

impl std::fmt::Display for BindingReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotIncluded => f.write_str("not included"),
            Self::Excluded => f.write_str("excluded"),
        }
    }
}

/// Module constraint attached to one endpoint of an edge type.
///
/// A module is allowed iff the include set is empty or contains it, AND the
/// exclude set does not contain it. Bindings reference module symbols, never
/// concrete types, so enforcement stays a pair of set lookups.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Binding {
    include: FxHashSet<ModuleSymbol>,
    exclude: FxHashSet<ModuleSymbol>,
}

impl Binding {
    /// A binding that allows every module.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Restricts the binding to the given modules.
    #[must_use]
    pub fn including<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ModuleSymbol>,
    {
        self.include.extend(modules.into_iter().map(Into::into));
        self
    }

    /// Rejects the given modules even when the include set would allow them.
    #[must_use]
    pub fn excluding<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ModuleSymbol>,
    {
        self.exclude.extend(modules.into_iter().map(Into::into));
        self
    }

    /// Checks `module` against this binding.
    ///
    /// Returns `None` when allowed, or the failing [`BindingReason`].
    /// Exclusion wins over inclusion.
    #[must_use]
    pub fn check(&self, module: &ModuleSymbol) -> Option<BindingReason> {
        if self.exclude.contains(module) {
            return Some(BindingReason::Excluded);
        }
        if !self.include.is_empty() && !self.include.contains(module) {
            return Some(BindingReason::NotIncluded);
        }
        None
    }

    /// Returns `true` when this binding allows every module.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> ModuleSymbol {
        ModuleSymbol::intern(name)
    }

    #[test]
    fn empty_binding_allows_everything() {
        let binding = Binding::any();
        assert!(binding.is_unrestricted());
        assert_eq!(binding.check(&sym("person")), None);
    }

    #[test]
    fn include_set_rejects_outsiders() {
        let binding = Binding::any().including(["person", "robot"]);
        assert_eq!(binding.check(&sym("person")), None);
        assert_eq!(binding.check(&sym("city")), Some(BindingReason::NotIncluded));
    }

    #[test]
    fn exclude_wins_over_include() {
        let binding = Binding::any().including(["person"]).excluding(["person"]);
        assert_eq!(binding.check(&sym("person")), Some(BindingReason::Excluded));
    }

    #[test]
    fn exclude_only_rejects_listed_modules() {
        let binding = Binding::any().excluding(["city"]);
        assert_eq!(binding.check(&sym("city")), Some(BindingReason::Excluded));
        assert_eq!(binding.check(&sym("person")), None);
    }
}
