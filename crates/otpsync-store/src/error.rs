//! Error types for the secret store.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store is full: all {capacity} slots are occupied")]
    CapacityExceeded { capacity: usize },

    #[error("No secret at position {0}")]
    NotFound(i64),

    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    #[error("Store is corrupt: {0}")]
    Corrupt(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<otpsync_core::Error> for StoreError {
    fn from(err: otpsync_core::Error) -> Self {
        match err {
            otpsync_core::Error::InvalidEntry(reason) => Self::InvalidEntry(reason),
            otpsync_core::Error::Io(e) => Self::Io(e),
            otpsync_core::Error::Json(e) => Self::Json(e),
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Convenience result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
