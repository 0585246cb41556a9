//! Persistent OTP secret store for otpsync.
//!
//! Secrets live in a flat key-value namespace shared with the theme setting:
//! one `secret_pair{i}` record per occupied slot plus an `otp_count` record.
//! [`SecretStore`] keeps the slots contiguous and writes every multi-key change
//! as a single [`WriteBatch`].

pub mod error;
pub mod kv;
pub mod settings;
pub mod store;

pub use error::{Result, StoreError};
pub use kv::{FileKvStore, KvStore, MemoryKvStore, WriteBatch, WriteOp};
pub use store::{AddOutcome, AddResult, DeleteOutcome, SecretStore};
