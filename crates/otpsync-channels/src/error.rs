//! Channel error types.

use std::io;
use thiserror::Error;

/// Errors that can occur while talking to the watch.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The watch or the platform rejected the message.
    #[error("Delivery rejected: {0}")]
    Nack(String),

    /// The delivery queue worker has stopped.
    #[error("Delivery queue closed")]
    QueueClosed,
}

impl ChannelError {
    /// Create a rejection error.
    pub fn nack(reason: impl Into<String>) -> Self {
        Self::Nack(reason.into())
    }

    /// Check if re-sending the same payload can succeed.
    ///
    /// Encoding failures repeat identically and a closed queue stays closed;
    /// everything else is a transport hiccup.
    pub fn is_retriable(&self) -> bool {
        !matches!(self, Self::Json(_) | Self::QueueClosed)
    }
}
