//! Error types for cargo-bump.
//!
//! All operations return `Result<T>` which aliases `Result<T, BumpError>`.

use thiserror::Error;

/// Errors from release operations.
#[derive(Debug, Error)]
pub enum BumpError {
    /// No manifest contained a `version = "X.Y.Z"` line.
    #[error("No version declaration found in any Cargo.toml")]
    NoVersionFound,

    /// Bump level was not one of `major`, `minor`, `patch`.
    #[error("Invalid level '{0}': expected one of major, minor, patch")]
    InvalidLevel(String),

    /// Version cannot be bumped (component out of range).
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    /// Compare links need a repository URL and none could be resolved.
    #[error(
        "Cannot resolve repository URL for compare links; pass --repository or set `repository` in Cargo.toml"
    )]
    MissingRepository,

    /// Restoring files after a failed commit did not fully succeed.
    #[error("Rollback failed: {0}")]
    RollbackFailed(String),

    /// File system operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml_edit::TomlError),

    /// Regex compilation failed (indicates bug).
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Unexpected error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for cargo-bump operations.
pub type Result<T> = std::result::Result<T, BumpError>;
