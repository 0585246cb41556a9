//! CLI command implementations.

pub mod config;
pub mod session;
pub mod store;

use anyhow::Context;
use otpsync_core::config::Config;
use otpsync_store::{FileKvStore, SecretStore};
use std::path::{Path, PathBuf};

/// Resolve the store file, preferring an explicit `--store` path.
pub fn store_path(config: &Config, explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(config.store_path()?),
    }
}

/// Open the secret store described by `config`.
pub fn open_store(config: &Config, explicit: Option<&Path>) -> anyhow::Result<SecretStore> {
    let path = store_path(config, explicit)?;
    let kv = FileKvStore::open(&path)
        .with_context(|| format!("Failed to open store {}", path.display()))?;
    let store = SecretStore::open(Box::new(kv), config.store.match_policy)
        .with_context(|| format!("Failed to load store {}", path.display()))?;
    Ok(store)
}
