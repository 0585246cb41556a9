//! # otpsync-core
//!
//! Core types, configuration, and utilities for otpsync.
//!
//! This crate provides shared functionality used across all otpsync crates:
//!
//! - **Configuration**: Loading, validation, and persistence of the config file
//! - **Types**: Secret entries, device message payloads and wire keys
//! - **Utilities**: Path resolution, ID generation, timezone and environment handling

pub mod config;
pub mod types;
pub mod error;
pub mod paths;
pub mod env;
pub mod id;
pub mod secret;
pub mod time;

// Re-exports for convenience
pub use config::Config;
pub use error::{ConfigError, Error, Result};
pub use secret::OtpSecret;
pub use types::*;
