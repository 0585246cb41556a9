//! Core type definitions for otpsync.

mod entry;
mod message;

pub use entry::*;
pub use message::*;
