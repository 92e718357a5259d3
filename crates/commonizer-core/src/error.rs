//! Error types for commonization runs.

use std::fmt;
use std::path::PathBuf;

use commonizer_targets::TargetError;

/// One library artifact that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    /// Location of the offending artifact.
    pub location: PathBuf,
    /// What went wrong.
    pub detail: String,
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location.display(), self.detail)
    }
}

fn summarize_failures(failures: &[LoadFailure]) -> String {
    failures
        .iter()
        .map(LoadFailure::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur while configuring or executing a commonization run.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The same leaf target was registered twice.
    #[error("target {target} is already registered")]
    DuplicateTarget { target: String },

    /// The dependee modules provider was set a second time.
    #[error("dependee modules provider is already set")]
    DependeeProviderAlreadySet,

    /// One or more library artifacts failed to load.
    #[error("failed to load {} library artifact(s): {}", .failures.len(), summarize_failures(.failures))]
    LibraryLoad { failures: Vec<LoadFailure> },

    /// A library manifest is structurally invalid.
    #[error("invalid library manifest: {detail}")]
    InvalidManifest { detail: String },

    /// The builtins class does not match the target's platform association.
    #[error("builtins class '{builtins_class}' is inconsistent with target {target}")]
    BuiltinsMismatch {
        target: String,
        builtins_class: String,
    },

    /// A commonization result violates the key-set invariant.
    #[error("malformed commonization result: {detail}")]
    ResultShape { detail: String },

    /// Target model error (unknown platform, malformed identity string, ...).
    #[error(transparent)]
    Target(#[from] TargetError),

    /// I/O error reading a library artifact.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error in a library manifest.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for commonization runs.
pub type Result<T> = std::result::Result<T, CoreError>;
