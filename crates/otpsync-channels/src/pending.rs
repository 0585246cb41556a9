//! Per-message retry accounting.
//!
//! A [`PendingSend`] carries one payload through the delivery state machine:
//!
//! ```text
//! Idle --begin_attempt--> Sending
//! Sending --on_success--> Delivered                     (retries reset)
//! Sending --on_failure, retries left--> Retrying --begin_attempt--> Sending
//! Sending --on_failure, exhausted--> Abandoned          (retries reset)
//! ```
//!
//! The retry counter belongs to the record, so interleaved deliveries cannot
//! disturb each other's accounting.

use crate::error::ChannelError;
use otpsync_core::types::DeviceMessage;
use serde::{Deserialize, Serialize};

/// State of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryState {
    /// Created, not yet sent.
    Idle,

    /// An attempt is in flight.
    Sending,

    /// The last attempt failed and another one is due.
    Retrying,

    /// The watch acknowledged the message.
    Delivered,

    /// Retries were exhausted and the message was dropped.
    Abandoned,
}

impl DeliveryState {
    /// Check if no further attempts will be made.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Abandoned)
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Re-send; `retry` is the 1-based retry number.
    Retry { retry: u32 },

    /// Give up.
    Abandon,
}

/// A message being delivered, with its own retry counter.
#[derive(Debug, Clone)]
pub struct PendingSend {
    id: String,
    message: DeviceMessage,
    retries: u32,
    max_retries: u32,
    attempts: u32,
    state: DeliveryState,
    last_error: Option<String>,
}

impl PendingSend {
    /// Create a pending delivery allowing `max_retries` re-sends after the
    /// first attempt.
    pub fn new(message: DeviceMessage, max_retries: u32) -> Self {
        Self {
            id: otpsync_core::id::delivery_id(),
            message,
            retries: 0,
            max_retries,
            attempts: 0,
            state: DeliveryState::Idle,
            last_error: None,
        }
    }

    /// Delivery identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The payload, identical on every attempt.
    pub fn message(&self) -> &DeviceMessage {
        &self.message
    }

    /// Retries consumed so far. Zero again once terminal.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Retry bound.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Attempts started so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Current state.
    pub fn state(&self) -> DeliveryState {
        self.state
    }

    /// Error from the most recent failed attempt.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Mark a new attempt as in flight.
    pub fn begin_attempt(&mut self) {
        debug_assert!(!self.state.is_terminal(), "attempt on finished delivery");
        self.attempts += 1;
        self.state = DeliveryState::Sending;
    }

    /// Record an acknowledgement.
    pub fn on_success(&mut self) {
        self.retries = 0;
        self.state = DeliveryState::Delivered;
    }

    /// Record a failed attempt and decide whether to retry.
    pub fn on_failure(&mut self, error: &ChannelError) -> Transition {
        self.last_error = Some(error.to_string());

        if error.is_retriable() && self.retries < self.max_retries {
            self.retries += 1;
            self.state = DeliveryState::Retrying;
            Transition::Retry {
                retry: self.retries,
            }
        } else {
            self.retries = 0;
            self.state = DeliveryState::Abandoned;
            Transition::Abandon
        }
    }
}
