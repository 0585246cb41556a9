//! Configuration schema definitions.

use crate::types::MatchPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main otpsync configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Key-value storage location.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Secret store behaviour.
    #[serde(default)]
    pub store: StoreConfig,

    /// Outbound delivery to the watch.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Configuration webview.
    #[serde(default)]
    pub webview: WebviewConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Store file path. Defaults to `~/.otpsync/store.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Secret store configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// How incoming secrets are matched against stored ones.
    #[serde(default)]
    pub match_policy: MatchPolicy,
}

/// Delivery configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Retries after the first failed attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed pause between attempts in milliseconds. Zero re-sends immediately.
    #[serde(default)]
    pub retry_delay_ms: u64,

    /// Capacity of the outbound message queue.
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,
}

fn default_max_retries() -> u32 {
    5
}

fn default_queue_size() -> usize {
    64
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: 0,
            queue_size: default_queue_size(),
        }
    }
}

/// Webview configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebviewConfig {
    /// Configuration page URL.
    #[serde(default = "default_webview_url")]
    pub url: String,

    /// Version reported to the configuration page.
    #[serde(default = "default_app_version")]
    pub app_version: u32,
}

fn default_webview_url() -> String {
    "http://oncloudvirtual.com/pebble/pebbleauth/".to_string()
}

fn default_app_version() -> u32 {
    2
}

impl Default for WebviewConfig {
    fn default() -> Self {
        Self {
            url: default_webview_url(),
            app_version: default_app_version(),
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
