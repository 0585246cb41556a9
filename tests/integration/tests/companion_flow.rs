//! End-to-end companion sessions over a file-backed store.

use otpsync_channels::RetryPolicy;
use otpsync_core::types::{keys, DeviceMessage};
use otpsync_integration_tests::{file_companion, secret_response};
use serde_json::json;
use tempfile::TempDir;

fn wire(companion: &otpsync_companion::Companion) -> Vec<String> {
    companion.store().entries().iter().map(|e| e.to_wire()).collect()
}

#[tokio::test]
async fn test_add_then_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let (mut companion, link) = file_companion(&path, RetryPolicy::default());
    let report = companion
        .on_webview_closed(&secret_response("Work", "jbsw y3dp"))
        .await
        .unwrap()
        .unwrap()
        .outcome()
        .await
        .unwrap();
    assert!(report.is_delivered());
    assert_eq!(link.delivered(), vec![DeviceMessage::transmit_key("Work:JBSWY3DP")]);
    companion.shutdown().await;

    // A new session sees the persisted entry and announces it.
    let (companion, link) = file_companion(&path, RetryPolicy::default());
    assert_eq!(wire(&companion), vec!["Work:JBSWY3DP"]);
    companion.on_ready(0).await.unwrap().outcome().await.unwrap();
    assert_eq!(link.delivered(), vec![DeviceMessage::session_start(1, 0, 0)]);
}

#[tokio::test]
async fn test_delete_compacts_persisted_slots() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    let seeded = json!({
        "otp_count": "3",
        "secret_pair0": "A:SECR1",
        "secret_pair1": "B:SECR2",
        "secret_pair2": "C:SECR3",
    });
    std::fs::write(&path, seeded.to_string()).unwrap();

    let (mut companion, link) = file_companion(&path, RetryPolicy::default());
    let request = DeviceMessage::new().with(keys::DELETE_KEY, "SECR2");
    companion
        .on_device_message(&request)
        .await
        .unwrap()
        .unwrap()
        .outcome()
        .await
        .unwrap();
    assert_eq!(link.delivered(), vec![DeviceMessage::delete_key("SECR2")]);
    companion.shutdown().await;

    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk["otp_count"], "2");
    assert_eq!(on_disk["secret_pair0"], "A:SECR1");
    assert_eq!(on_disk["secret_pair1"], "C:SECR3");
    assert!(on_disk.get("secret_pair2").is_none());
}

#[tokio::test]
async fn test_full_store_rejects_new_secret() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let (mut companion, link) = file_companion(&path, RetryPolicy::default());
    for i in 0..16 {
        let secret = format!("KEY{}", (b'A' + i as u8) as char);
        companion
            .on_webview_closed(&secret_response(&format!("L{i}"), &secret))
            .await
            .unwrap()
            .unwrap();
    }
    assert_eq!(companion.store().count(), 16);
    let before = wire(&companion);

    let ticket = companion
        .on_webview_closed(&secret_response("New", "XYZ"))
        .await
        .unwrap();
    assert!(ticket.is_none());
    assert_eq!(wire(&companion), before);

    companion.shutdown().await;
    assert_eq!(link.delivered().len(), 16);
}

#[tokio::test]
async fn test_watch_requests_each_position() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let (mut companion, link) = file_companion(&path, RetryPolicy::default());
    for (label, secret) in [("A", "AAAA"), ("B", "BBBB")] {
        companion
            .on_webview_closed(&secret_response(label, secret))
            .await
            .unwrap();
    }

    for position in 0..=3 {
        let request = DeviceMessage::new().with(keys::REQUEST_KEY, position);
        let ticket = companion.on_device_message(&request).await.unwrap();
        assert_eq!(ticket.is_some(), (1..=2).contains(&position));
    }
    companion.shutdown().await;

    let replies: Vec<DeviceMessage> = link.delivered().into_iter().skip(2).collect();
    assert_eq!(
        replies,
        vec![
            DeviceMessage::transmit_key("A:AAAA"),
            DeviceMessage::transmit_key("B:BBBB"),
        ]
    );
}

#[tokio::test]
async fn test_relabel_keeps_position() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let (mut companion, link) = file_companion(&path, RetryPolicy::default());
    for (label, secret) in [("A", "AAAA"), ("B", "BBBB"), ("A2", "aaaa")] {
        companion
            .on_webview_closed(&secret_response(label, secret))
            .await
            .unwrap();
    }
    assert_eq!(wire(&companion), vec!["A2:AAAA", "B:BBBB"]);

    companion.shutdown().await;
    assert_eq!(
        link.delivered().last(),
        Some(&DeviceMessage::transmit_key("A2:AAAA"))
    );
}
