//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable as a boolean.
pub fn get_bool(name: &str) -> bool {
    get_var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Environment variable names recognised by otpsync.
pub mod vars {
    /// Base directory override.
    pub const OTPSYNC_HOME: &str = "OTPSYNC_HOME";

    /// Config file override.
    pub const OTPSYNC_CONFIG: &str = "OTPSYNC_CONFIG";

    /// Store file override.
    pub const OTPSYNC_STORE: &str = "OTPSYNC_STORE";

    /// Debug mode, equivalent to `-v`.
    pub const OTPSYNC_DEBUG: &str = "OTPSYNC_DEBUG";
}
