//! CLI argument parsing and routing tests.

use clap::Parser;
use otpsync_cli::{run, Cli, Commands};
use otpsync_core::config::Config;
use tempfile::TempDir;

#[test]
fn test_parse_all_session_commands() {
    let cases: &[&[&str]] = &[
        &["otpsync", "ready"],
        &["otpsync", "add", "--label", "Work", "--secret", "JBSWY3DP"],
        &["otpsync", "configure", r#"{"theme":1}"#],
        &["otpsync", "device", r#"{"request_key":1}"#],
        &["otpsync", "delete", "JBSW"],
        &["otpsync", "list"],
        &["otpsync", "url"],
    ];
    for args in cases {
        assert!(Cli::try_parse_from(*args).is_ok(), "failed to parse {:?}", args);
    }
}

#[test]
fn test_unknown_command_rejected() {
    assert!(Cli::try_parse_from(["otpsync", "sync-all"]).is_err());
}

#[test]
fn test_verbose_is_counted() {
    let cli = Cli::try_parse_from(["otpsync", "-vv", "version"]).unwrap();
    assert_eq!(cli.verbose, 2);
    assert!(matches!(cli.command, Commands::Version));
}

#[tokio::test]
async fn test_add_then_list_against_store_file() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store.json");
    let store_arg = store.to_str().unwrap();

    let cli = Cli::try_parse_from([
        "otpsync", "--store", store_arg, "add", "--label", "Work", "--secret", "jbsw y3dp",
    ])
    .unwrap();
    run(cli, Config::default()).await.unwrap();

    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store).unwrap()).unwrap();
    assert_eq!(on_disk["otp_count"], "1");
    assert_eq!(on_disk["secret_pair0"], "Work:JBSWY3DP");

    let cli = Cli::try_parse_from(["otpsync", "--store", store_arg, "list"]).unwrap();
    run(cli, Config::default()).await.unwrap();
}

#[tokio::test]
async fn test_invalid_device_message_fails() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store.json");

    let cli = Cli::try_parse_from([
        "otpsync",
        "--store",
        store.to_str().unwrap(),
        "device",
        "[1,2,3]",
    ])
    .unwrap();
    assert!(run(cli, Config::default()).await.is_err());
}
