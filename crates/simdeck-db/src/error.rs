//! Error types for deck operations.

use simdeck_schema::SchemaError;
use thiserror::Error;

/// Errors raised by assignment, ingestion, and validation.
#[derive(Debug, Error)]
pub enum DeckError {
    /// Assignment to a name with no metadata match. Diagnostic-only by
    /// default; escalated to this error under strict mode.
    #[error("field `{name}` is not part of the expected schema at `{node_path}`")]
    UnknownField { node_path: String, name: String },

    /// A value violated a domain rule during immediate validation.
    #[error("invalid value for `{path}`: {message}")]
    Validation { path: String, message: String },

    /// An ingestion key whose container cannot be resolved. The value is
    /// routed to the side-store; this error fires only when the caller
    /// requested fail-on-undefined.
    #[error("key `{key}` does not resolve to any schema field")]
    UnresolvedKey { key: String },

    /// Assignment to a reserved `_name_`-form key.
    #[error("`{name}` is a reserved name")]
    ReservedName { name: String },

    /// Malformed or incomplete schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Malformed YAML ingestion source.
    #[error("failed to parse YAML input: {0}")]
    Yaml(#[from] yaml_rust2::ScanError),

    /// Unreadable ingestion source file.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for deck operations.
pub type DeckResult<T> = Result<T, DeckError>;
