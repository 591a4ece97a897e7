//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Remote mail store call failed.
    #[error("Remote error: {0}")]
    Remote(#[from] mailtriage_jmap::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The target scan folder does not exist on the server.
    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    /// Credential storage error.
    #[error("Credential error: {0}")]
    Credential(#[from] keyring::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
