//! Config save/load roundtrip integration tests.

use otpsync_core::config::Config;
use otpsync_core::types::MatchPolicy;
use otpsync_integration_tests::{configured_companion, secret_response};
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("otpsync.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.delivery.max_retries, config.delivery.max_retries);
    assert_eq!(loaded.delivery.queue_size, config.delivery.queue_size);
    assert_eq!(loaded.webview.url, config.webview.url);
    assert_eq!(loaded.store.match_policy, MatchPolicy::Substring);
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("otpsync.json5");

    let mut config = Config::default();
    config.delivery.max_retries = 2;
    config.store.match_policy = MatchPolicy::Exact;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.delivery.max_retries, 2);
    assert_eq!(loaded.store.match_policy, MatchPolicy::Exact);
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/otpsync.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_invalid() {
    let result = Config::parse("not valid json");
    assert!(result.is_err());
}

#[tokio::test]
async fn test_exact_policy_session() {
    let dir = TempDir::new().unwrap();
    let config = Config::parse(
        r#"{
            // exact matching keeps short secrets apart
            store: { match_policy: "exact" },
            delivery: { max_retries: 1 },
        }"#,
    )
    .unwrap();

    let (mut companion, link) = configured_companion(&config, &dir.path().join("store.json"));
    for (label, secret) in [("Long", "ABCDEF"), ("Short", "ABC")] {
        companion
            .on_webview_closed(&secret_response(label, secret))
            .await
            .unwrap();
    }
    assert_eq!(companion.store().count(), 2);

    link.fail_always();
    let report = companion.on_ready(0).await.unwrap().outcome().await.unwrap();
    assert_eq!(report.attempts, 2);
}
