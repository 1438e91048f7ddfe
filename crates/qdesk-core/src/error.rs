//! Error types for qdesk

use thiserror::Error;

/// Main error type for qdesk operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for qdesk operations
pub type Result<T> = std::result::Result<T, Error>;
