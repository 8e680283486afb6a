//! Entry store error types

use thiserror::Error;

/// Errors that can occur in an entry store
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Requested entry does not exist
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// An entry with this identifier already exists
    #[error("Duplicate entry id: {0}")]
    DuplicateId(String),

    /// Entry failed basic validation
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    /// Store file has an unknown format version
    #[error("Unsupported store version: {0}")]
    UnsupportedVersion(u32),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
