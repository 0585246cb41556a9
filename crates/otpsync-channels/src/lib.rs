//! Watch message delivery for otpsync.
//!
//! This crate provides the [`DeviceLink`] abstraction over the phone-to-watch
//! message channel and the [`SyncChannel`] delivery queue that pushes
//! messages through it with bounded automatic retry.

pub mod error;
pub mod link;
pub mod pending;
pub mod delivery;
pub mod memory;
pub mod jsonl;

pub use error::ChannelError;
pub use link::{DeviceLink, SendReceipt};
pub use pending::{DeliveryState, PendingSend, Transition};
pub use delivery::{
    deliver, DeliveryOutcome, DeliveryReport, DeliveryStats, DeliveryTicket, RetryPolicy,
    SyncChannel,
};
pub use memory::MemoryLink;
pub use jsonl::JsonLinesLink;

/// Result type for channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;
