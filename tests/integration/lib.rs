//! Shared fixtures for otpsync integration tests.

use otpsync_channels::{MemoryLink, RetryPolicy, SyncChannel};
use otpsync_companion::Companion;
use otpsync_core::config::{Config, WebviewConfig};
use otpsync_core::types::MatchPolicy;
use otpsync_store::{FileKvStore, SecretStore};
use std::path::Path;
use std::sync::Arc;

/// Open a companion over the store file at `path` with an in-memory link.
pub fn file_companion(path: &Path, policy: RetryPolicy) -> (Companion, Arc<MemoryLink>) {
    let kv = FileKvStore::open(path).unwrap();
    let store = SecretStore::open(Box::new(kv), MatchPolicy::Substring).unwrap();
    let link = Arc::new(MemoryLink::new("watch"));
    let channel = SyncChannel::start(link.clone(), policy, 16);
    (
        Companion::new(store, channel, WebviewConfig::default()),
        link,
    )
}

/// Open a companion configured from `config`, storing at `path`.
pub fn configured_companion(config: &Config, path: &Path) -> (Companion, Arc<MemoryLink>) {
    let kv = FileKvStore::open(path).unwrap();
    let store = SecretStore::open(Box::new(kv), config.store.match_policy).unwrap();
    let link = Arc::new(MemoryLink::new("watch"));
    let channel = SyncChannel::from_config(link.clone(), &config.delivery);
    (
        Companion::new(store, channel, config.webview.clone()),
        link,
    )
}

/// Build a configuration page response for one secret.
pub fn secret_response(label: &str, secret: &str) -> String {
    serde_json::json!({ "label": label, "secret": secret }).to_string()
}
