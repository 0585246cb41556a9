//! The phone-to-watch message link.

use crate::Result;
use async_trait::async_trait;
use otpsync_core::types::DeviceMessage;
use std::fmt::Debug;

/// One request/response primitive for pushing a dictionary to the watch.
///
/// A call resolves once the platform reports the outcome of that single
/// attempt: `Ok` when the watch acknowledged it, `Err` when it was rejected
/// or lost. Implementations never retry on their own.
#[async_trait]
pub trait DeviceLink: Send + Sync + Debug {
    /// Identifier used in log lines.
    fn link_id(&self) -> &str;

    /// Attempt to deliver `message` once.
    async fn send(&self, message: &DeviceMessage) -> Result<SendReceipt>;
}

/// Acknowledgement for a delivered message.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    /// Transaction id assigned by the link.
    pub transaction_id: u64,

    /// Time the acknowledgement was received.
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl SendReceipt {
    /// Create a receipt stamped with the current time.
    pub fn new(transaction_id: u64) -> Self {
        Self {
            transaction_id,
            timestamp: chrono::Utc::now(),
        }
    }
}
