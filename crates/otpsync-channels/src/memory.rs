//! In-memory watch link.
//!
//! Records every attempt and can be scripted to reject a number of attempts,
//! which makes retry behaviour observable in tests and dry runs.

use crate::error::ChannelError;
use crate::link::{DeviceLink, SendReceipt};
use crate::Result;
use async_trait::async_trait;
use otpsync_core::types::DeviceMessage;
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct LinkState {
    attempted: Vec<DeviceMessage>,
    delivered: Vec<DeviceMessage>,
    fail_next: usize,
    fail_always: bool,
    next_transaction: u64,
}

/// A scripted in-memory [`DeviceLink`].
#[derive(Debug)]
pub struct MemoryLink {
    id: String,
    state: Mutex<LinkState>,
}

impl MemoryLink {
    /// Create a link that accepts every message.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(LinkState::default()),
        }
    }

    /// Reject the next `count` attempts.
    pub fn fail_next(&self, count: usize) {
        self.state.lock().fail_next = count;
    }

    /// Reject every attempt until [`MemoryLink::recover`] is called.
    pub fn fail_always(&self) {
        self.state.lock().fail_always = true;
    }

    /// Stop rejecting attempts.
    pub fn recover(&self) {
        let mut state = self.state.lock();
        state.fail_always = false;
        state.fail_next = 0;
    }

    /// Every attempted message, including rejected ones.
    pub fn attempted(&self) -> Vec<DeviceMessage> {
        self.state.lock().attempted.clone()
    }

    /// Messages that were accepted, in order.
    pub fn delivered(&self) -> Vec<DeviceMessage> {
        self.state.lock().delivered.clone()
    }

    /// Number of attempts made.
    pub fn attempts(&self) -> usize {
        self.state.lock().attempted.len()
    }
}

#[async_trait]
impl DeviceLink for MemoryLink {
    fn link_id(&self) -> &str {
        &self.id
    }

    async fn send(&self, message: &DeviceMessage) -> Result<SendReceipt> {
        let mut state = self.state.lock();
        state.attempted.push(message.clone());
        state.next_transaction += 1;
        let transaction_id = state.next_transaction;

        if state.fail_always {
            return Err(ChannelError::nack(format!("transaction {transaction_id} rejected")));
        }
        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(ChannelError::nack(format!("transaction {transaction_id} rejected")));
        }

        state.delivered.push(message.clone());
        Ok(SendReceipt::new(transaction_id))
    }
}
