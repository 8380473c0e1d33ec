//! The deck tree: arena-backed nodes and the field assignment contract.
//!
//! Every field write goes through [`Deck::set`], which performs the
//! dispatch (known leaf / value-node child / unknown), appends to the
//! field's history, runs immediate validation when the context asks for
//! it, and applies the field's decorators before storing.

use crate::context::DeckContext;
use crate::error::{DeckError, DeckResult};
use indexmap::IndexMap;
use simdeck_schema::{
    check_domains, render_violations, split_tokens, value_tokens, Decorator, DomainContext,
    FsProbe, LeafSpec, NodeSpec, SchemaError, SchemaRegistry, Value,
};
use tracing::{debug, warn};

/// Schema graphs for input decks are trees; the guard catches a generated
/// schema that accidentally declares a recursive child type.
const MAX_SCHEMA_DEPTH: usize = 64;

/// Index of a node in its deck's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Storage for one leaf field: current value, schema metadata, and the
/// append-only history of every value ever assigned.
#[derive(Debug, Clone)]
pub struct FieldSlot {
    pub(crate) value: Option<Value>,
    pub(crate) spec: LeafSpec,
    pub(crate) history: Vec<Value>,
}

impl FieldSlot {
    fn new(spec: LeafSpec) -> Self {
        FieldSlot {
            value: spec.default.clone(),
            spec,
            history: Vec::new(),
        }
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn spec(&self) -> &LeafSpec {
        &self.spec
    }

    pub fn history(&self) -> &[Value] {
        &self.history
    }

    /// Whether the field still holds its declared default.
    pub(crate) fn is_default(&self) -> bool {
        match (&self.value, &self.spec.default) {
            (Some(value), Some(default)) => value == default,
            _ => false,
        }
    }

    /// Whether the field was ever explicitly assigned.
    pub(crate) fn is_set(&self) -> bool {
        !self.history.is_empty()
    }

    /// Active fields flatten, count, and validate; the rest are invisible.
    pub(crate) fn is_active(&self, skip_default: bool) -> bool {
        match &self.value {
            Some(_) => {
                !skip_default || !self.is_default() || self.spec.mandatory() || self.is_set()
            }
            None => self.spec.mandatory(),
        }
    }
}

/// A named slot in a node's namespace.
#[derive(Debug, Clone)]
pub enum Entry {
    /// Schema leaf field.
    Leaf(FieldSlot),
    /// Child node.
    Child(NodeId),
    /// Raw value stored for a name the schema does not know. Unknown
    /// values survive and flatten so nothing a user typed is lost.
    Extra(Value),
}

/// One tree node: a namespace of fields, children, and extras, plus an
/// optional wrapped scalar slot for "value nodes".
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) name: String,
    pub(crate) type_name: String,
    pub(crate) prefix: Option<String>,
    pub(crate) entries: IndexMap<String, Entry>,
    pub(crate) wrapped: Option<FieldSlot>,
    pub(crate) side_store: IndexMap<String, Value>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Field name of this node under its parent (empty for the root).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema type name, matched by the `{TypeName}` selector.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    /// The wrapped scalar slot, when this is a value node.
    pub fn wrapped(&self) -> Option<&FieldSlot> {
        self.wrapped.as_ref()
    }

    pub fn side_store(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.side_store.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Reserved `_name_`-form keys are markers in ingestion sources, never
/// field names.
pub(crate) fn is_reserved(name: &str) -> bool {
    name.len() >= 2 && name.starts_with('_') && name.ends_with('_')
}

/// Strip `prefix` from `name` when it is actually there.
pub(crate) fn strip_prefix<'a>(name: &'a str, prefix: Option<&str>) -> &'a str {
    match prefix {
        Some(p) if !p.is_empty() => name.strip_prefix(p).unwrap_or(name),
        _ => name,
    }
}

/// The deck: an arena of nodes built from a schema registry.
#[derive(Debug, Clone)]
pub struct Deck {
    pub(crate) nodes: Vec<Node>,
    pub(crate) registry: SchemaRegistry,
}

enum SetTarget {
    Leaf(String),
    Wrapped(NodeId),
    Unknown,
}

impl Deck {
    /// Build the full static tree for `root_type`: every declared child
    /// spec becomes a node attached to its parent at construction.
    pub fn new(registry: &SchemaRegistry, root_type: &str) -> DeckResult<Self> {
        let mut deck = Deck {
            nodes: Vec::new(),
            registry: registry.clone(),
        };
        deck.instantiate(root_type, None, String::new(), 0)?;
        Ok(deck)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    fn instantiate(
        &mut self,
        type_name: &str,
        parent: Option<NodeId>,
        name: String,
        depth: usize,
    ) -> DeckResult<NodeId> {
        if depth > MAX_SCHEMA_DEPTH {
            return Err(SchemaError::NestingTooDeep {
                max_depth: MAX_SCHEMA_DEPTH,
                name: type_name.to_string(),
            }
            .into());
        }
        let spec: NodeSpec = self.registry.require(type_name)?.clone();
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            name: name.clone(),
            type_name: type_name.to_string(),
            prefix: spec.prefix.clone(),
            entries: IndexMap::new(),
            wrapped: spec.value.clone().map(FieldSlot::new),
            side_store: IndexMap::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].entries.insert(name, Entry::Child(id));
        }
        for (field_name, field_spec) in spec.fields {
            match field_spec {
                simdeck_schema::FieldSpec::Leaf(leaf) => {
                    self.nodes[id.0]
                        .entries
                        .insert(field_name, Entry::Leaf(FieldSlot::new(leaf)));
                }
                simdeck_schema::FieldSpec::Child { node_type } => {
                    self.instantiate(&node_type, Some(id), field_name, depth + 1)?;
                }
            }
        }
        Ok(id)
    }

    fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.nodes[current.0].parent {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Resolve `name` against a node's namespace, completing a missing
    /// prefix: the node-level prefix first, then each entry's own.
    pub(crate) fn resolve_key(&self, id: NodeId, name: &str) -> Option<String> {
        let node = &self.nodes[id.0];
        if node.entries.contains_key(name) {
            return Some(name.to_string());
        }
        if let Some(prefix) = &node.prefix {
            let candidate = format!("{}{}", prefix, name);
            if node.entries.contains_key(&candidate) {
                return Some(candidate);
            }
        }
        for (key, entry) in &node.entries {
            let prefix = match entry {
                Entry::Leaf(slot) => slot.spec.prefix.as_deref(),
                Entry::Child(child) => self.nodes[child.0].prefix.as_deref(),
                Entry::Extra(_) => None,
            };
            if strip_prefix(key, prefix) == name {
                return Some(key.clone());
            }
        }
        None
    }

    /// Direct child node lookup by (possibly prefix-stripped) name.
    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let key = self.resolve_key(id, name)?;
        match self.nodes[id.0].entries.get(&key)? {
            Entry::Child(child) => Some(*child),
            _ => None,
        }
    }

    /// Direct children whose schema type equals `type_name`, in
    /// declaration order.
    pub fn children_of_type(&self, id: NodeId, type_name: &str) -> Vec<NodeId> {
        self.nodes[id.0]
            .entries
            .values()
            .filter_map(|entry| match entry {
                Entry::Child(child) if self.nodes[child.0].type_name == type_name => Some(*child),
                _ => None,
            })
            .collect()
    }

    /// Dot-qualified name of a node, prefixes stripped. Empty for the root.
    pub fn full_name(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut current = id;
        while self.nodes[current.0].parent.is_some() {
            let node = &self.nodes[current.0];
            parts.push(strip_prefix(&node.name, node.prefix.as_deref()).to_string());
            current = node.parent.expect("checked above");
        }
        parts.reverse();
        parts.join(".")
    }

    fn diagnostic_path(&self, id: NodeId) -> String {
        let name = self.full_name(id);
        if name.is_empty() {
            "(root)".to_string()
        } else {
            name
        }
    }

    /// Assign a field value. The single entry point for all field writes:
    /// dispatch, history logging, optional immediate validation, and
    /// decoration all happen here.
    pub fn set(
        &mut self,
        id: NodeId,
        name: &str,
        value: Value,
        ctx: &DeckContext,
    ) -> DeckResult<()> {
        if is_reserved(name) {
            return Err(DeckError::ReservedName {
                name: name.to_string(),
            });
        }

        let target = match self.resolve_key(id, name) {
            Some(key) => match &self.nodes[id.0].entries[&key] {
                Entry::Leaf(_) => SetTarget::Leaf(key),
                Entry::Child(child) if self.nodes[child.0].wrapped.is_some() => {
                    SetTarget::Wrapped(*child)
                }
                Entry::Child(_) | Entry::Extra(_) => SetTarget::Unknown,
            },
            None => SetTarget::Unknown,
        };

        let spec = match &target {
            SetTarget::Leaf(key) => match &self.nodes[id.0].entries[key] {
                Entry::Leaf(slot) => Some(slot.spec.clone()),
                _ => unreachable!("resolved to a leaf"),
            },
            SetTarget::Wrapped(child) => self.nodes[child.0]
                .wrapped
                .as_ref()
                .map(|slot| slot.spec.clone()),
            SetTarget::Unknown => None,
        };

        if matches!(target, SetTarget::Unknown) {
            let path = self.diagnostic_path(id);
            warn!(
                node = %path,
                field = %name,
                "field is not part of the expected schema"
            );
            if ctx.strict {
                return Err(DeckError::UnknownField {
                    node_path: path,
                    name: name.to_string(),
                });
            }
            self.nodes[id.0]
                .entries
                .insert(name.to_string(), Entry::Extra(value));
            return Ok(());
        }
        let spec = spec.expect("known targets carry a spec");

        // History logs the raw value, before validation and decoration.
        match &target {
            SetTarget::Leaf(key) => {
                if let Some(Entry::Leaf(slot)) = self.nodes[id.0].entries.get_mut(key) {
                    slot.history.push(value.clone());
                }
            }
            SetTarget::Wrapped(child) => {
                if let Some(slot) = self.nodes[child.0].wrapped.as_mut() {
                    slot.history.push(value.clone());
                }
            }
            SetTarget::Unknown => {}
        }

        if ctx.immediate_validation {
            let probe = FsProbe;
            let domain_ctx = DomainContext::new(ctx.working_directory.as_deref(), &probe);
            let violations = check_domains(Some(&value), &spec.domains, &domain_ctx);
            if !violations.is_empty() {
                let path = match &target {
                    SetTarget::Wrapped(child) => self.full_name(*child),
                    _ => {
                        let base = self.full_name(id);
                        if base.is_empty() {
                            name.to_string()
                        } else {
                            format!("{}.{}", base, name)
                        }
                    }
                };
                let message = render_violations(&violations);
                warn!(key = %path, %message, "domain violation");
                if ctx.strict {
                    return Err(DeckError::Validation { path, message });
                }
            }
        }

        let decorated = self.decorate(id, &spec, value)?;

        match target {
            SetTarget::Leaf(key) => {
                if let Some(Entry::Leaf(slot)) = self.nodes[id.0].entries.get_mut(&key) {
                    slot.value = Some(decorated);
                }
            }
            SetTarget::Wrapped(child) => {
                if let Some(slot) = self.nodes[child.0].wrapped.as_mut() {
                    slot.value = Some(decorated);
                }
            }
            SetTarget::Unknown => unreachable!("handled above"),
        }
        debug!(node = %self.diagnostic_path(id), field = %name, "field assigned");
        Ok(())
    }

    /// Run the field's decorators in order, returning the value to store.
    fn decorate(&mut self, owner: NodeId, spec: &LeafSpec, mut value: Value) -> DeckResult<Value> {
        for decorator in &spec.decorators {
            match decorator {
                Decorator::SplitToList => {
                    value = split_tokens(&value);
                }
                Decorator::SpawnChildren {
                    node_type,
                    location,
                } => {
                    let tokens = value_tokens(&value);
                    self.spawn_children(owner, node_type, location, &tokens)?;
                }
            }
        }
        Ok(value)
    }

    /// Create one typed child per token under every node matched by
    /// `location`, skipping names that already exist.
    fn spawn_children(
        &mut self,
        owner: NodeId,
        node_type: &str,
        location: &str,
        tokens: &[String],
    ) -> DeckResult<()> {
        let spec_prefix = self.registry.require(node_type)?.prefix.clone();
        let targets = self.select(owner, location);
        for target in targets {
            for token in tokens {
                let name = match &spec_prefix {
                    Some(p) if !token.starts_with(p.as_str()) => format!("{}{}", p, token),
                    _ => token.clone(),
                };
                if self.nodes[target.0].entries.contains_key(&name) {
                    continue;
                }
                let depth = self.depth(target) + 1;
                self.instantiate(node_type, Some(target), name, depth)?;
            }
        }
        Ok(())
    }

    /// Read a field value. Dotted keys navigate with the path selector;
    /// a value-node child yields its wrapped value. With `skip_default`, a
    /// field that was never explicitly assigned reads as absent.
    pub fn get(&self, id: NodeId, key: &str, skip_default: bool) -> Option<&Value> {
        if key.is_empty() {
            return None;
        }
        let tokens: Vec<&str> = key.split('.').collect();
        let (container, last) = if tokens.len() > 1 {
            let location = tokens[..tokens.len() - 1].join("/");
            let selection = self.select(id, &location);
            (*selection.first()?, tokens[tokens.len() - 1])
        } else {
            (id, tokens[0])
        };

        let resolved = self.resolve_key(container, last)?;
        match self.nodes[container.0].entries.get(&resolved)? {
            Entry::Leaf(slot) => {
                if skip_default && !slot.is_set() {
                    None
                } else {
                    slot.value.as_ref()
                }
            }
            Entry::Child(child) => {
                let slot = self.nodes[child.0].wrapped.as_ref()?;
                if skip_default && !slot.is_set() {
                    None
                } else {
                    slot.value.as_ref()
                }
            }
            Entry::Extra(value) => Some(value),
        }
    }

    /// Names of the active fields of a node, in declaration order.
    ///
    /// Children are active when their subtree has nonzero size; leaves
    /// when set and (under `skip_default`) non-default, mandatory, or
    /// explicitly set; unset mandatory leaves are always active.
    pub fn keys(&self, id: NodeId, skip_default: bool) -> impl Iterator<Item = &str> + '_ {
        self.nodes[id.0]
            .entries
            .iter()
            .filter(move |&(_, entry)| match entry {
                Entry::Child(child) => self.size(*child) > 0,
                Entry::Extra(_) => true,
                Entry::Leaf(slot) => slot.is_active(skip_default),
            })
            .map(|(name, _)| name.as_str())
    }

    /// Count of active fields in the subtree rooted at `id`.
    ///
    /// An active wrapped scalar contributes 1, each child its own
    /// recursive count, an unset mandatory leaf 1, and a container with no
    /// active descendants 0.
    pub fn size(&self, id: NodeId) -> usize {
        let node = &self.nodes[id.0];
        let mut count = 0;
        if let Some(wrapped) = &node.wrapped {
            if wrapped.is_active(true) {
                count += 1;
            }
        }
        for entry in node.entries.values() {
            match entry {
                Entry::Child(child) => count += self.size(*child),
                Entry::Extra(_) => count += 1,
                Entry::Leaf(slot) => {
                    if slot.is_active(true) {
                        count += 1;
                    }
                }
            }
        }
        count
    }

    /// Help text for a node (`name = None`) or one of its fields.
    pub fn help(&self, id: NodeId, name: Option<&str>) -> Option<&str> {
        let node = &self.nodes[id.0];
        match name {
            None => self.registry.get(&node.type_name)?.help.as_deref(),
            Some(name) => {
                let key = self.resolve_key(id, name)?;
                match node.entries.get(&key)? {
                    Entry::Leaf(slot) => slot.spec.help.as_deref(),
                    Entry::Child(child) => {
                        let child = &self.nodes[child.0];
                        let spec = self.registry.get(&child.type_name)?;
                        spec.help
                            .as_deref()
                            .or_else(|| spec.value.as_ref().and_then(|v| v.help.as_deref()))
                    }
                    Entry::Extra(_) => None,
                }
            }
        }
    }
}
