// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Type modules: declarations binding a module symbol to a schema and,
//! for edges, endpoint constraints.
//!
//! A type module plays two roles: a declaration registered up front (schema,
//! bindings) and a runtime tag on each entity (`metadata.module`). The
//! [`TypeRegistry`] holds declarations per store; enforcement happens in the
//! adapter. Entities whose module has no declaration pass validation
//! unconstrained — declaring types is opt-in, matching the open attribute
//! model.
use rustc_hash::FxHashMap;

use crate::binding::Binding;
use crate::ident::ModuleSymbol;
use crate::metadata::EntityKind;
use crate::schema::Schema;

/// Registered declaration for one type module.
#[derive(Clone, PartialEq, Debug)]
pub struct TypeDecl {
    /// The symbol entities of this type carry in `metadata.module`.
    pub module: ModuleSymbol,
    /// Which entity kind the type declares.
    pub entity_kind: EntityKind,
    /// Optional schema validated against the entity's `data` map.
    pub data_schema: Option<Schema>,
    /// Constraint on the source node's module (edge types only).
    pub source_binding: Binding,
    /// Constraint on the target node's module (edge types only).
    pub target_binding: Binding,
}

impl TypeDecl {
    fn new(module: impl Into<ModuleSymbol>, entity_kind: EntityKind) -> Self {
        Self {
            module: module.into(),
            entity_kind,
            data_schema: None,
            source_binding: Binding::any(),
            target_binding: Binding::any(),
        }
    }

    /// Declares a graph type.
    #[must_use]
    pub fn graph(module: impl Into<ModuleSymbol>) -> Self {
        Self::new(module, EntityKind::Graph)
    }

    /// Declares a node type.
    #[must_use]
    pub fn node(module: impl Into<ModuleSymbol>) -> Self {
        Self::new(module, EntityKind::Node)
    }

    /// Declares an edge type.
    #[must_use]
    pub fn edge(module: impl Into<ModuleSymbol>) -> Self {
        Self::new(module, EntityKind::Edge)
    }

    /// Attaches a data schema.
    #[must_use]
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.data_schema = Some(schema);
        self
    }

    /// Constrains the source endpoint (edge types).
    #[must_use]
    pub fn with_source_binding(mut self, binding: Binding) -> Self {
        self.source_binding = binding;
        self
    }

    /// Constrains the target endpoint (edge types).
    #[must_use]
    pub fn with_target_binding(mut self, binding: Binding) -> Self {
        self.target_binding = binding;
        self
    }
}

/// Statically declared type module.
///
/// Implementors provide the module name and kind; schema and bindings have
/// permissive defaults. [`EntityType::declare`] composes the pieces into a
/// [`TypeDecl`] for registration:
///
/// ```
/// use trellis_core::{Binding, EntityKind, EntityType, ModuleSymbol, TypeRegistry};
///
/// struct WorksAt;
///
/// impl EntityType for WorksAt {
///     fn module() -> ModuleSymbol {
///         ModuleSymbol::intern("works_at")
///     }
///     fn entity_kind() -> EntityKind {
///         EntityKind::Edge
///     }
///     fn source_binding() -> Binding {
///         Binding::any().including(["person"])
///     }
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry.register_type::<WorksAt>();
/// assert!(registry.get(&WorksAt::module()).is_some());
/// ```
pub trait EntityType {
    /// The symbol entities of this type carry.
    fn module() -> ModuleSymbol;

    /// Which entity kind the type declares.
    fn entity_kind() -> EntityKind;

    /// Optional schema for the entity's `data` map.
    #[must_use]
    fn data_schema() -> Option<Schema> {
        None
    }

    /// Source endpoint constraint (edge types).
    #[must_use]
    fn source_binding() -> Binding {
        Binding::any()
    }

    /// Target endpoint constraint (edge types).
    #[must_use]
    fn target_binding() -> Binding {
        Binding::any()
    }

    /// Composes the declaration from the pieces above.
    #[must_use]
    fn declare() -> TypeDecl {
        let mut decl = match Self::entity_kind() {
            EntityKind::Graph => TypeDecl::graph(Self::module()),
            EntityKind::Node => TypeDecl::node(Self::module()),
            EntityKind::Edge => TypeDecl::edge(Self::module()),
        };
        decl.data_schema = Self::data_schema();
        decl.source_binding = Self::source_binding();
        decl.target_binding = Self::target_binding();
        decl
    }
}

/// Per-store table of type declarations.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    decls: FxHashMap<ModuleSymbol, TypeDecl>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a declaration, replacing any previous one for the module.
    pub fn register(&mut self, decl: TypeDecl) -> &mut Self {
        self.decls.insert(decl.module.clone(), decl);
        self
    }

    /// Registers a statically declared type.
    pub fn register_type<T: EntityType>(&mut self) -> &mut Self {
        self.register(T::declare())
    }

    /// Looks up the declaration for a module.
    #[must_use]
    pub fn get(&self, module: &ModuleSymbol) -> Option<&TypeDecl> {
        self.decls.get(module)
    }

    /// Number of registered declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Returns `true` when no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, FieldType};

    #[test]
    fn register_replaces_previous_declaration() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeDecl::node("person"));
        registry.register(
            TypeDecl::node("person").with_schema(
                Schema::default().field(FieldSpec::required("name", FieldType::String)),
            ),
        );
        assert_eq!(registry.len(), 1);
        let decl = registry.get(&ModuleSymbol::intern("person"));
        assert!(decl.is_some_and(|d| d.data_schema.is_some()));
    }

    #[test]
    fn trait_declaration_composes_bindings() {
        struct WorksAt;
        impl EntityType for WorksAt {
            fn module() -> ModuleSymbol {
                ModuleSymbol::intern("works_at")
            }
            fn entity_kind() -> EntityKind {
                EntityKind::Edge
            }
            fn source_binding() -> Binding {
                Binding::any().including(["person"])
            }
            fn target_binding() -> Binding {
                Binding::any().including(["company"])
            }
        }

        let decl = WorksAt::declare();
        assert_eq!(decl.entity_kind, EntityKind::Edge);
        assert!(decl.source_binding.check(&ModuleSymbol::intern("person")).is_none());
        assert!(decl.target_binding.check(&ModuleSymbol::intern("person")).is_some());
    }
}
