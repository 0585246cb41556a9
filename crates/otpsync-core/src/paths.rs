//! Path resolution utilities.

use crate::env::{self, vars};
use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the otpsync base directory (~/.otpsync, or `$OTPSYNC_HOME`).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = env::get_var(vars::OTPSYNC_HOME) {
        return Ok(expand_tilde(&home));
    }
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".otpsync"))
}

/// Get the main config file path (~/.otpsync/otpsync.json5).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("otpsync.json5"))
}

/// Get the default key-value store path (~/.otpsync/store.json).
pub fn store_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("store.json"))
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_file_under_base_dir() {
        let base = base_dir().unwrap();
        let store = store_file().unwrap();
        assert!(store.starts_with(&base));
        assert!(store.ends_with("store.json"));
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde("~/test");
        assert!(!expanded.to_string_lossy().contains('~'));

        let untouched = expand_tilde("/var/lib/otpsync");
        assert_eq!(untouched, PathBuf::from("/var/lib/otpsync"));
    }
}
