//! Node and field specs, and the schema registry.
//!
//! Generated schemas describe every node type of the deck tree: which
//! fields it has, which children, which domain rules and decorators apply.
//! The registry is plain data — `serde` derives let generators ship it as
//! JSON — plus a small builder API used by tests and programmatic callers.

use crate::decorator::Decorator;
use crate::domain::{is_mandatory, Domain};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or resolving a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to parse schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("schema has no node type named `{name}`")]
    UnknownNodeType { name: String },

    #[error("schema nesting too deep (max depth: {max_depth}) at type `{name}`")]
    NestingTooDeep { max_depth: usize, name: String },
}

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Metadata for a leaf field (or a node's wrapped value slot).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeafSpec {
    /// Domain rules constraining legal values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<Domain>,

    /// Decorators applied at assignment, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<Decorator>,

    /// Default value the field starts out with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Name prefix to strip when emitting the flat key (legacy keys may
    /// start with characters the generator cannot use in identifiers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Help text surfaced by the runtime `help()` lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl LeafSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domains.push(domain);
        self
    }

    pub fn with_decorator(mut self, decorator: Decorator) -> Self {
        self.decorators.push(decorator);
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Whether this field carries the mandatory rule.
    pub fn mandatory(&self) -> bool {
        is_mandatory(&self.domains)
    }
}

/// A named slot on a node: either a leaf value or a child node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldSpec {
    /// Scalar or list-of-scalars leaf.
    Leaf(LeafSpec),

    /// Statically declared child node of the given type.
    Child { node_type: String },
}

/// Schema for one node type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Fields in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, FieldSpec>,

    /// Wrapped value slot: when present, a node of this type is a "value
    /// node" carrying one scalar alongside its children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<LeafSpec>,

    /// Name prefix applied to dynamically spawned children of this type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Help text for the node itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl NodeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_leaf(mut self, name: impl Into<String>, spec: LeafSpec) -> Self {
        self.fields.insert(name.into(), FieldSpec::Leaf(spec));
        self
    }

    pub fn with_child(mut self, name: impl Into<String>, node_type: impl Into<String>) -> Self {
        self.fields.insert(
            name.into(),
            FieldSpec::Child {
                node_type: node_type.into(),
            },
        );
        self
    }

    pub fn with_value(mut self, spec: LeafSpec) -> Self {
        self.value = Some(spec);
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Leaf spec for a field name, if that field is a leaf.
    pub fn leaf(&self, name: &str) -> Option<&LeafSpec> {
        match self.fields.get(name) {
            Some(FieldSpec::Leaf(spec)) => Some(spec),
            _ => None,
        }
    }
}

/// The set of node types making up a deck schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaRegistry {
    types: IndexMap<String, NodeSpec>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a registry from generated schema JSON.
    pub fn from_json(text: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Register a node type. Replaces any previous spec of the same name.
    pub fn insert(&mut self, name: impl Into<String>, spec: NodeSpec) {
        self.types.insert(name.into(), spec);
    }

    pub fn get(&self, name: &str) -> Option<&NodeSpec> {
        self.types.get(name)
    }

    /// Like [`get`](Self::get) but failing with a schema error.
    pub fn require(&self, name: &str) -> SchemaResult<&NodeSpec> {
        self.types
            .get(name)
            .ok_or_else(|| SchemaError::UnknownNodeType {
                name: name.to_string(),
            })
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(|s| s.as_str())
    }
}
