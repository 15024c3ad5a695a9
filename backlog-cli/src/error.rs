use thiserror::Error;

use backlog_core::ValidationError;
use backlog_remote::ClientError;
use backlog_store::{ImageError, StoreError};

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Input rejected before it reached the store
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Record store or backend failure
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Cover image could not be read or encoded
    #[error("{0}")]
    Image(#[from] ImageError),

    /// Remote client could not be created
    #[error("{0}")]
    Client(#[from] ClientError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Runtime creation or async error
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl CliError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }
}
