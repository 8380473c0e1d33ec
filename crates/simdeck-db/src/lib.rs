//! Database object model for simulation input decks.
//!
//! A deck is a schema-constrained tree of named fields. This crate owns the
//! tree and everything that moves data on and off it:
//!
//! - [`Deck`]: arena-backed tree of [`Node`]s addressed by [`NodeId`];
//!   field assignment with validation, decoration, and history logging
//! - [`Deck::select`]: the `/`-delimited path-selector grammar
//! - [`extract`]: tree ⇄ flat dot-qualified map conversion
//! - [`FlatMap::sorted_by_priority`]: deterministic replay ordering
//! - [`validate`]: recursive domain-rule evaluation with diagnostics
//! - [`Deck::ingest`]: normalization of key/value pairs, nested maps, YAML
//!   documents, and flat maps into one replay pipeline
//!
//! # Design
//!
//! The tree is an arena: nodes store their parent's index, not a live
//! reference, so traversal in both directions needs no interior
//! mutability. All process-wide settings of the legacy tooling (strict
//! flags, working directory, engine version) travel in an explicit
//! [`DeckContext`] value constructed once per top-level operation.
//!
//! # Example
//!
//! ```rust
//! use simdeck_db::{Deck, DeckContext};
//! use simdeck_schema::{Domain, LeafSpec, NodeSpec, SchemaRegistry, Value};
//!
//! let mut registry = SchemaRegistry::new();
//! registry.insert(
//!     "Run",
//!     NodeSpec::new().with_leaf("FileVersion", LeafSpec::new().with_domain(Domain::int_min(4))),
//! );
//!
//! let mut deck = Deck::new(&registry, "Run").unwrap();
//! let ctx = DeckContext::default();
//! let root = deck.root();
//! deck.set(root, "FileVersion", Value::from(4i64), &ctx).unwrap();
//! assert_eq!(deck.get(root, "FileVersion", false), Some(&Value::from(4i64)));
//! ```

mod context;
mod error;
pub mod extract;
mod ingest;
mod node;
pub mod priority;
mod select;
pub mod validate;

pub use context::DeckContext;
pub use error::{DeckError, DeckResult};
pub use extract::FlatMap;
pub use ingest::{IngestOptions, IngestSource};
pub use node::{Deck, Entry, FieldSlot, Node, NodeId};
pub use validate::{ValidateOptions, ValidationReport};

// The value model is part of this crate's public surface.
pub use simdeck_schema::{Scalar, Value};
