//! Error types for tally-core

use thiserror::Error;

use crate::remote::RemoteError;

/// Result type alias using tally-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tally-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Remote channel error
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Sync requested without an authenticated remote channel
    #[error("Not authenticated. Please sign in to sync.")]
    NotAuthenticated,

    /// Sync requested while another sync is still running
    #[error("A sync is already in progress")]
    SyncInProgress,
}
