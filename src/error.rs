use thiserror::Error;

use crate::git::GitFailure;

/// Unified error type for release-train operations
#[derive(Error, Debug)]
pub enum ReleaseTrainError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error(transparent)]
    GitCommand(#[from] GitFailure),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Trigger context error: {0}")]
    Context(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results in release-train
pub type Result<T> = std::result::Result<T, ReleaseTrainError>;

impl ReleaseTrainError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseTrainError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseTrainError::Version(msg.into())
    }

    /// Create a manifest error with context
    pub fn manifest(msg: impl Into<String>) -> Self {
        ReleaseTrainError::Manifest(msg.into())
    }

    /// Create a trigger context error
    pub fn context(msg: impl Into<String>) -> Self {
        ReleaseTrainError::Context(msg.into())
    }
}
