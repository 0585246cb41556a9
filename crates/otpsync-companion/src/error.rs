//! Companion error types.

use otpsync_channels::ChannelError;
use otpsync_store::StoreError;
use thiserror::Error;

/// Errors that can occur while handling a companion event.
#[derive(Debug, Error)]
pub enum CompanionError {
    /// Secret store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Delivery channel error.
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Malformed configuration response.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration page URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type for companion operations.
pub type Result<T> = std::result::Result<T, CompanionError>;
