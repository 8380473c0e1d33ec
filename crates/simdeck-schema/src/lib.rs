//! Schema data model for simdeck input decks.
//!
//! A simulation input deck is a tree of named fields constrained by an
//! externally generated schema. This crate defines that schema as data:
//!
//! - [`Scalar`] / [`Value`]: the field value model (scalars and ordered
//!   lists of scalars)
//! - [`Domain`]: per-field validation rules ([`check_domains`] evaluates a
//!   rule set against a value)
//! - [`Decorator`]: value-transforming rules applied at assignment time
//! - [`LeafSpec`] / [`FieldSpec`] / [`NodeSpec`]: per-field and per-node
//!   metadata
//! - [`SchemaRegistry`]: the set of node types, loadable from JSON
//!
//! The tree itself (nodes, assignment, validation traversal) lives in
//! `simdeck-db`; this crate is deliberately free of any tree machinery so
//! that schema generators can target it directly.
//!
//! # Example
//!
//! ```rust
//! use simdeck_schema::{Domain, LeafSpec, NodeSpec, SchemaRegistry};
//!
//! let mut registry = SchemaRegistry::new();
//! registry.insert(
//!     "Topology",
//!     NodeSpec::new()
//!         .with_leaf("P", LeafSpec::new().with_domain(Domain::int_min(1)))
//!         .with_leaf("Q", LeafSpec::new().with_domain(Domain::int_min(1))),
//! );
//!
//! let spec = registry.get("Topology").unwrap();
//! assert!(spec.leaf("P").is_some());
//! ```

mod decorator;
mod domain;
mod spec;
mod value;

pub use decorator::{split_tokens, value_tokens, Decorator};
pub use domain::{
    check_domains, render_violations, Domain, DomainContext, FileProbe, FsProbe, Violation,
};
pub use spec::{FieldSpec, LeafSpec, NodeSpec, SchemaError, SchemaRegistry, SchemaResult};
pub use value::{Scalar, Value};
