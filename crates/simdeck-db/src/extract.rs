//! Tree ⇄ flat map conversion.
//!
//! The flat dot-qualified key/value map is the canonical interchange form:
//! ingestion normalizes every source into one, and serialization derives
//! one from the tree. Flattening visits only *active* fields (see
//! [`Deck::keys`]), strips name prefixes, collapses lists to space-joined
//! tokens, and copies side-store entries through verbatim.

use crate::node::{strip_prefix, Deck, Entry, NodeId};
use indexmap::IndexMap;
use simdeck_schema::Value;
use yaml_rust2::Yaml;

/// Ordered mapping from fully dot-qualified key to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatMap {
    entries: IndexMap<String, Value>,
}

impl FlatMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// Render every value to its canonical string form, for downstream
    /// codecs that only speak text.
    pub fn to_string_map(&self) -> IndexMap<String, String> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.render()))
            .collect()
    }
}

impl FromIterator<(String, Value)> for FlatMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        FlatMap {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FlatMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

fn qualify(parent_namespace: &str, name: &str) -> String {
    if parent_namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent_namespace, name)
    }
}

/// Flatten the subtree rooted at `id` into a [`FlatMap`].
///
/// Active fields only; the qualified key of a field is its parent
/// namespace plus the prefix-stripped field name. A value node's wrapped
/// scalar is emitted iff it is mandatory, non-default, or explicitly set,
/// and recursion then continues into the node's own fields.
pub fn deck_to_flat(deck: &Deck, id: NodeId) -> FlatMap {
    let mut flat = FlatMap::new();
    fill_from_node(deck, id, &mut flat, "");
    flat
}

fn fill_from_node(deck: &Deck, id: NodeId, flat: &mut FlatMap, parent_namespace: &str) {
    let node = deck.node(id);

    for (key, value) in node.side_store() {
        flat.insert(key, value.to_flat());
    }

    let active: Vec<String> = deck.keys(id, true).map(|s| s.to_string()).collect();
    for name in active {
        match node.entry(&name) {
            Some(Entry::Child(child)) => {
                let child_node = deck.node(*child);
                let stripped = strip_prefix(&name, child_node.prefix.as_deref());
                let qualified = qualify(parent_namespace, stripped);
                if let Some(wrapped) = child_node.wrapped() {
                    let emit = wrapped.spec().mandatory()
                        || !wrapped.is_default()
                        || wrapped.is_set();
                    if emit {
                        if let Some(value) = wrapped.value() {
                            flat.insert(qualified.clone(), value.to_flat());
                        }
                    }
                }
                fill_from_node(deck, *child, flat, &qualified);
            }
            Some(Entry::Leaf(slot)) => {
                if let Some(value) = slot.value() {
                    let stripped = strip_prefix(&name, slot.spec().prefix.as_deref());
                    flat.insert(qualify(parent_namespace, stripped), value.to_flat());
                }
            }
            Some(Entry::Extra(value)) => {
                flat.insert(qualify(parent_namespace, &name), value.to_flat());
            }
            None => {}
        }
    }
}

/// Reserved marker for "this nested map node is a wrapped scalar at the
/// current namespace".
const VALUE_MARKER: &str = "_value_";

fn is_private_key(name: &str) -> bool {
    name.len() >= 2 && name.starts_with('_') && name.ends_with('_')
}

/// Scalar conversion for nested-map leaves. `None` for null and other
/// unrepresentable YAML nodes.
fn yaml_to_value(yaml: &Yaml) -> Option<Value> {
    match yaml {
        Yaml::Boolean(b) => Some(Value::from(*b)),
        Yaml::Integer(i) => Some(Value::from(*i)),
        Yaml::Real(text) => text.parse::<f64>().ok().map(Value::from),
        Yaml::String(s) => Some(Value::from(s.as_str())),
        Yaml::Array(items) => {
            let scalars: Vec<simdeck_schema::Scalar> = items
                .iter()
                .filter_map(|item| match yaml_to_value(item) {
                    Some(Value::Scalar(s)) => Some(s),
                    _ => None,
                })
                .collect();
            Some(Value::List(scalars))
        }
        _ => None,
    }
}

/// Flatten an externally supplied nested map.
///
/// Non-private, non-null keys are emitted dot-qualified; hashes recurse;
/// the `_value_` marker assigns to the current namespace itself.
pub fn nested_to_flat(nested: &Yaml) -> FlatMap {
    let mut flat = FlatMap::new();
    fill_from_nested(nested, &mut flat, "");
    flat
}

fn fill_from_nested(yaml: &Yaml, flat: &mut FlatMap, parent_namespace: &str) {
    let Yaml::Hash(entries) = yaml else {
        return;
    };
    for (key, value) in entries {
        let Yaml::String(key) = key else {
            continue;
        };

        if key == VALUE_MARKER && !parent_namespace.is_empty() {
            if let Some(value) = yaml_to_value(value) {
                flat.insert(parent_namespace, value);
            }
            continue;
        }
        if is_private_key(key) || matches!(value, Yaml::Null) {
            continue;
        }

        let qualified = qualify(parent_namespace, key);
        if let Yaml::Hash(_) = value {
            fill_from_nested(value, flat, &qualified);
        } else if let Some(value) = yaml_to_value(value) {
            flat.insert(qualified, value);
        }
    }
}
