//! Read-only store commands.

use otpsync_companion::configuration_url;
use otpsync_core::config::Config;
use std::path::Path;

/// List stored secrets by position and label.
pub fn list(config: &Config, store: Option<&Path>) -> anyhow::Result<()> {
    let store = super::open_store(config, store)?;

    if store.is_empty() {
        println!("No secrets stored.");
        return Ok(());
    }

    println!("{:<4} {:<16} {}", "POS", "LABEL", "LENGTH");
    println!("{}", "-".repeat(30));
    for (index, entry) in store.entries().iter().enumerate() {
        println!("{:<4} {:<16} {}", index + 1, entry.label, entry.secret.len());
    }
    println!(
        "\n{} of {} slot(s) used, theme {}.",
        store.count(),
        otpsync_core::MAX_OTP,
        store.theme()
    );

    Ok(())
}

/// Print the configuration page URL.
pub fn url(config: &Config, store: Option<&Path>) -> anyhow::Result<()> {
    let store = super::open_store(config, store)?;
    let url = configuration_url(&config.webview, store.count())?;
    println!("{}", url);
    Ok(())
}
