//! Ingestion: normalize external key/value data onto the tree.
//!
//! Every source — a single pair, a nested map, a YAML document, a flat
//! map handed over by a legacy-record reader — is reduced to one flat
//! dot-qualified map, priority-sorted, and replayed through the single
//! assignment entry point. Multi-segment keys resolve their container
//! with the path selector; keys that resolve nowhere land in the
//! side-store with a diagnostic.

use crate::context::DeckContext;
use crate::error::{DeckError, DeckResult};
use crate::extract::{nested_to_flat, FlatMap};
use crate::node::{Deck, NodeId};
use simdeck_schema::Value;
use std::fs;
use std::path::Path;
use tracing::warn;
use yaml_rust2::{Yaml, YamlLoader};

/// One ingestion source. All variants normalize to a flat map.
#[derive(Debug)]
pub enum IngestSource<'a> {
    /// A single dot-qualified key and its value.
    Pair(&'a str, Value),
    /// A flat dot-qualified map (e.g. a legacy record parsed externally).
    Flat(FlatMap),
    /// A nested hierarchical map.
    Nested(&'a Yaml),
    /// Inline YAML text.
    YamlText(&'a str),
    /// Path to a YAML document.
    YamlFile(&'a Path),
}

/// Per-call ingestion options.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Turn side-store fallbacks into [`DeckError::UnresolvedKey`].
    pub fail_on_undefined: bool,
}

impl Deck {
    /// Ingest a source relative to `id`: normalize, priority-sort, replay.
    pub fn ingest(
        &mut self,
        id: NodeId,
        source: IngestSource<'_>,
        options: &IngestOptions,
        ctx: &DeckContext,
    ) -> DeckResult<()> {
        let flat = match source {
            IngestSource::Pair(key, value) => {
                return self.set_path(id, key, value, options, ctx);
            }
            IngestSource::Flat(flat) => flat,
            IngestSource::Nested(yaml) => nested_to_flat(yaml),
            IngestSource::YamlText(text) => {
                let docs = YamlLoader::load_from_str(text)?;
                match docs.first() {
                    Some(doc) => nested_to_flat(doc),
                    None => FlatMap::new(),
                }
            }
            IngestSource::YamlFile(path) => {
                let text = fs::read_to_string(path)?;
                let docs = YamlLoader::load_from_str(&text)?;
                match docs.first() {
                    Some(doc) => nested_to_flat(doc),
                    None => FlatMap::new(),
                }
            }
        };

        for (key, value) in flat.sorted_by_priority() {
            self.set_path(id, &key, value, options, ctx)?;
        }
        Ok(())
    }

    /// Assign one dot-qualified key relative to `id`.
    ///
    /// Multi-segment keys resolve their container through the path
    /// selector and assign the final segment there. A key whose container
    /// cannot be resolved is stored in the side-store under its
    /// full-name-qualified form, with a diagnostic.
    pub fn set_path(
        &mut self,
        id: NodeId,
        key: &str,
        value: Value,
        options: &IngestOptions,
        ctx: &DeckContext,
    ) -> DeckResult<()> {
        if key.is_empty() {
            return Ok(());
        }

        let tokens: Vec<&str> = key.split('.').collect();
        if tokens.len() == 1 {
            return self.set(id, tokens[0], value, ctx);
        }

        let location = tokens[..tokens.len() - 1].join("/");
        if let Some(container) = self.select(id, &location).first().copied() {
            return self.set(container, tokens[tokens.len() - 1], value, ctx);
        }

        self.side_store(id, key, value, options)
    }

    /// Route an unresolvable key to the side-store.
    fn side_store(
        &mut self,
        id: NodeId,
        key: &str,
        value: Value,
        options: &IngestOptions,
    ) -> DeckResult<()> {
        let namespace = self.full_name(id);
        let full_key = if namespace.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", namespace, key)
        };
        warn!(
            node = %if namespace.is_empty() { "(root)" } else { namespace.as_str() },
            key = %full_key,
            value = %value,
            "using side-store for a key that resolves to no schema field"
        );
        if options.fail_on_undefined {
            return Err(DeckError::UnresolvedKey { key: full_key });
        }
        self.nodes[id.0].side_store.insert(full_key, value);
        Ok(())
    }
}
