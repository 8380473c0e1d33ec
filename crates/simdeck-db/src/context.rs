//! Per-operation settings.
//!
//! The legacy tooling kept strict flags, the working directory, and the
//! detected engine version in process-wide mutable globals, overridden and
//! restored around every validate/serialize call. Here those settings are
//! an immutable value constructed once per top-level operation and passed
//! down explicitly; nothing needs restoring because nothing is shared.

use std::path::{Path, PathBuf};

/// Immutable context threaded through set/ingest/validate calls.
#[derive(Debug, Clone, Default)]
pub struct DeckContext {
    /// Escalate schema violations (unknown fields, immediate-validation
    /// failures) from diagnostics to errors.
    pub strict: bool,

    /// Validate each assignment against its domain rules as it happens,
    /// instead of deferring to a validation pass.
    pub immediate_validation: bool,

    /// Base directory for file-existence domain rules.
    pub working_directory: Option<PathBuf>,

    /// Engine version string, surfaced to version-gated collaborators.
    pub engine_version: Option<String>,
}

impl DeckContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_immediate_validation(mut self, immediate: bool) -> Self {
        self.immediate_validation = immediate;
        self
    }

    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn with_engine_version(mut self, version: impl Into<String>) -> Self {
        self.engine_version = Some(version.into());
        self
    }

    /// Context for a nested call with a different working directory,
    /// leaving `self` untouched.
    pub fn rebased(&self, dir: impl AsRef<Path>) -> Self {
        let mut ctx = self.clone();
        ctx.working_directory = Some(dir.as_ref().to_path_buf());
        ctx
    }
}
