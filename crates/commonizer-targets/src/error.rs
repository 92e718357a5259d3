//! Error types for the target model.

/// Errors that can occur when building or parsing commonizer targets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    /// A platform name violates the naming rules.
    #[error("invalid platform name '{name}': {detail}")]
    InvalidPlatformName { name: String, detail: String },

    /// A platform name is not present in the registry.
    #[error("unknown platform: {name}")]
    UnknownPlatform { name: String },

    /// A shared target was built from zero sub-targets.
    #[error("shared target must have at least one sub-target")]
    EmptySharedTarget,

    /// An identity string is malformed.
    #[error("malformed identity string '{input}' at offset {position}: {detail}")]
    Parse {
        input: String,
        position: usize,
        detail: String,
    },
}

/// Result type for target operations.
pub type Result<T> = std::result::Result<T, TargetError>;
