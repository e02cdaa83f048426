// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Storable records: graphs, nodes, edges, and the patch type for updates.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ident::{EntityId, ModuleSymbol};
use crate::metadata::{EntityKind, Metadata};

/// Arbitrary attribute map carried by every entity.
pub type AttrMap = serde_json::Map<String, Value>;

/// A logical scope grouping nodes and edges.
///
/// Graphs group but do not isolate: edges may cross graphs, and `graph_id`
/// on nodes and edges is optional.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct GraphRecord {
    /// Unique id within the store's graph table.
    pub id: EntityId,
    /// Human-readable graph name.
    pub name: String,
    /// Open attribute map.
    pub data: AttrMap,
    /// Store-managed metadata.
    pub metadata: Metadata,
}

impl GraphRecord {
    /// Constructs a graph record with a generated id and fresh metadata.
    #[must_use]
    pub fn new(module: impl Into<ModuleSymbol>, name: impl Into<String>) -> Self {
        Self {
            id: EntityId::generate(),
            name: name.into(),
            data: AttrMap::new(),
            metadata: Metadata::new(EntityKind::Graph, module.into()),
        }
    }

    /// Overrides the generated id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<EntityId>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets one attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// A vertex in the property graph.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Unique id within the store's node table.
    pub id: EntityId,
    /// Optional owning graph.
    pub graph_id: Option<EntityId>,
    /// Open attribute map, validated against the type module's schema.
    pub data: AttrMap,
    /// Store-managed metadata; `metadata.module` is the node's type.
    pub metadata: Metadata,
}

impl NodeRecord {
    /// Constructs a node record with a generated id and fresh metadata.
    #[must_use]
    pub fn new(module: impl Into<ModuleSymbol>) -> Self {
        Self {
            id: EntityId::generate(),
            graph_id: None,
            data: AttrMap::new(),
            metadata: Metadata::new(EntityKind::Node, module.into()),
        }
    }

    /// Overrides the generated id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<EntityId>) -> Self {
        self.id = id.into();
        self
    }

    /// Parents the node under a graph.
    #[must_use]
    pub fn in_graph(mut self, graph_id: impl Into<EntityId>) -> Self {
        self.graph_id = Some(graph_id.into());
        self
    }

    /// Sets one attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Replaces the whole attribute map.
    #[must_use]
    pub fn with_data(mut self, data: AttrMap) -> Self {
        self.data = data;
        self
    }
}

/// A directed connection between two nodes.
///
/// `weight` may live either in the dedicated field or under
/// `data[weight_property]`; weight extraction accepts both forms.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Unique id within the store's edge table.
    pub id: EntityId,
    /// Optional owning graph. Never compared against endpoint graphs.
    pub graph_id: Option<EntityId>,
    /// Source node id.
    pub source: EntityId,
    /// Target node id.
    pub target: EntityId,
    /// Optional discriminator between parallel edges.
    pub key: Option<String>,
    /// Optional edge weight.
    pub weight: Option<f64>,
    /// Open attribute map, validated against the type module's schema.
    pub data: AttrMap,
    /// Store-managed metadata; `metadata.module` is the edge's type.
    pub metadata: Metadata,
}

impl EdgeRecord {
    /// Constructs an edge record with a generated id and fresh metadata.
    #[must_use]
    pub fn new(
        module: impl Into<ModuleSymbol>,
        source: impl Into<EntityId>,
        target: impl Into<EntityId>,
    ) -> Self {
        Self {
            id: EntityId::generate(),
            graph_id: None,
            source: source.into(),
            target: target.into(),
            key: None,
            weight: None,
            data: AttrMap::new(),
            metadata: Metadata::new(EntityKind::Edge, module.into()),
        }
    }

    /// Overrides the generated id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<EntityId>) -> Self {
        self.id = id.into();
        self
    }

    /// Parents the edge under a graph.
    #[must_use]
    pub fn in_graph(mut self, graph_id: impl Into<EntityId>) -> Self {
        self.graph_id = Some(graph_id.into());
        self
    }

    /// Sets the parallel-edge discriminator.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the edge weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Sets one attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// Any storable entity.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum Entity {
    /// A graph record.
    Graph(GraphRecord),
    /// A node record.
    Node(NodeRecord),
    /// An edge record.
    Edge(EdgeRecord),
}

impl Entity {
    /// Returns the entity's id.
    #[must_use]
    pub fn id(&self) -> &EntityId {
        match self {
            Self::Graph(g) => &g.id,
            Self::Node(n) => &n.id,
            Self::Edge(e) => &e.id,
        }
    }

    /// Returns the entity's kind.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Graph(_) => EntityKind::Graph,
            Self::Node(_) => EntityKind::Node,
            Self::Edge(_) => EntityKind::Edge,
        }
    }

    /// Returns the store-managed metadata.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        match self {
            Self::Graph(g) => &g.metadata,
            Self::Node(n) => &n.metadata,
            Self::Edge(e) => &e.metadata,
        }
    }

    /// Returns the store-managed metadata for mutation.
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        match self {
            Self::Graph(g) => &mut g.metadata,
            Self::Node(n) => &mut n.metadata,
            Self::Edge(e) => &mut e.metadata,
        }
    }

    /// Returns the attribute map.
    #[must_use]
    pub fn data(&self) -> &AttrMap {
        match self {
            Self::Graph(g) => &g.data,
            Self::Node(n) => &n.data,
            Self::Edge(e) => &e.data,
        }
    }

    /// Returns the attribute map for mutation.
    pub fn data_mut(&mut self) -> &mut AttrMap {
        match self {
            Self::Graph(g) => &mut g.data,
            Self::Node(n) => &mut n.data,
            Self::Edge(e) => &mut e.data,
        }
    }

    /// Returns the node record, if this is a node.
    #[must_use]
    pub fn as_node(&self) -> Option<&NodeRecord> {
        match self {
            Self::Node(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the edge record, if this is an edge.
    #[must_use]
    pub fn as_edge(&self) -> Option<&EdgeRecord> {
        match self {
            Self::Edge(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the graph record, if this is a graph.
    #[must_use]
    pub fn as_graph(&self) -> Option<&GraphRecord> {
        match self {
            Self::Graph(g) => Some(g),
            _ => None,
        }
    }

    /// Resolves a named field: direct attribute first, then the `data` map.
    ///
    /// This is the lookup order `list` filters use. Direct attributes are
    /// `id`, `graph_id`, `name`, `source`, `target`, `key`, `weight`,
    /// `type` (the module symbol), `version`, and `deleted`, per kind.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Value> {
        let direct = match (self, name) {
            (_, "id") => Some(Value::String(self.id().to_string())),
            (_, "type" | "module") => Some(Value::String(self.metadata().module.to_string())),
            (_, "version") => Some(Value::from(self.metadata().version)),
            (_, "deleted") => Some(Value::Bool(self.metadata().deleted)),
            (Self::Graph(g), "name") => Some(Value::String(g.name.clone())),
            (Self::Node(n), "graph_id") => n.graph_id.as_ref().map(|g| Value::String(g.to_string())),
            (Self::Edge(e), "graph_id") => e.graph_id.as_ref().map(|g| Value::String(g.to_string())),
            (Self::Edge(e), "source") => Some(Value::String(e.source.to_string())),
            (Self::Edge(e), "target") => Some(Value::String(e.target.to_string())),
            (Self::Edge(e), "key") => e.key.as_ref().map(|k| Value::String(k.clone())),
            (Self::Edge(e), "weight") => e.weight.map(Value::from),
            _ => None,
        };
        direct.or_else(|| self.data().get(name).cloned())
    }

    /// Returns `true` when every `(field, value)` pair in `filter` matches.
    ///
    /// The empty filter matches everything.
    #[must_use]
    pub fn matches_filter(&self, filter: &AttrMap) -> bool {
        filter
            .iter()
            .all(|(key, expected)| self.field(key).as_ref() == Some(expected))
    }
}

impl From<GraphRecord> for Entity {
    fn from(record: GraphRecord) -> Self {
        Self::Graph(record)
    }
}

impl From<NodeRecord> for Entity {
    fn from(record: NodeRecord) -> Self {
        Self::Node(record)
    }
}

impl From<EdgeRecord> for Entity {
    fn from(record: EdgeRecord) -> Self {
        Self::Edge(record)
    }
}

/// Partial update applied to an existing entity by id.
///
/// `data` is shallow-merged into the entity's attribute map (patch keys
/// win). Direct fields are replaced only when set here; a patch can set but
/// not clear an optional field. `deleted` requests a soft-delete, which
/// stamps `deleted_at` and flips the mirror flag.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Patch {
    /// Id of the entity to update.
    pub id: EntityId,
    /// Attributes merged into the entity's `data`.
    pub data: AttrMap,
    /// New source node (edges only); re-checked against bindings.
    pub source: Option<EntityId>,
    /// New target node (edges only); re-checked against bindings.
    pub target: Option<EntityId>,
    /// New name (graphs only).
    pub name: Option<String>,
    /// New parallel-edge key (edges only).
    pub key: Option<String>,
    /// New weight (edges only).
    pub weight: Option<f64>,
    /// New owning graph (nodes and edges).
    pub graph_id: Option<EntityId>,
    /// Request a soft-delete.
    pub deleted: bool,
}

impl Patch {
    /// Starts a patch for the entity with `id`.
    #[must_use]
    pub fn update(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Merges one attribute into the entity's `data`.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Merges a whole attribute map into the entity's `data`.
    #[must_use]
    pub fn merge(mut self, data: AttrMap) -> Self {
        self.data.extend(data);
        self
    }

    /// Moves the edge's source endpoint.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<EntityId>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Moves the edge's target endpoint.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<EntityId>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Renames the graph.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the edge weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Marks the entity soft-deleted.
    #[must_use]
    pub fn mark_deleted(mut self) -> Self {
        self.deleted = true;
        self
    }
}
