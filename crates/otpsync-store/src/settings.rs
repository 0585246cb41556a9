//! Scalar settings persisted next to the secret slots.

use tracing::{debug, warn};

use crate::error::Result;
use crate::kv::{KvStore, WriteBatch};
use crate::store::SecretStore;

/// Storage key holding the theme id.
pub const THEME_KEY: &str = "theme";

/// Read the theme, treating a missing or unreadable value as 0.
pub(crate) fn load_theme(kv: &dyn KvStore) -> Result<i64> {
    Ok(match kv.get(THEME_KEY)? {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(value = %raw, "unreadable {THEME_KEY}, using 0");
            0
        }),
        None => 0,
    })
}

impl SecretStore {
    /// Current theme id.
    pub fn theme(&self) -> i64 {
        self.theme
    }

    /// Persist a new theme. Returns `false` without writing when unchanged.
    pub fn set_theme(&mut self, theme: i64) -> Result<bool> {
        if theme == self.theme {
            return Ok(false);
        }
        self.kv_mut()
            .apply(WriteBatch::new().set(THEME_KEY, theme.to_string()))?;
        debug!(from = self.theme, to = theme, "theme changed");
        self.theme = theme;
        Ok(true)
    }
}
