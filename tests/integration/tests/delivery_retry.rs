//! Delivery retry behaviour seen through a companion session.

use otpsync_channels::{DeliveryOutcome, RetryPolicy};
use otpsync_core::types::DeviceMessage;
use otpsync_integration_tests::{file_companion, secret_response};
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_failing_watch_abandons_after_bound() {
    let dir = TempDir::new().unwrap();
    let (mut companion, link) =
        file_companion(&dir.path().join("store.json"), RetryPolicy::default());
    link.fail_always();

    let report = companion
        .on_webview_closed(&secret_response("Work", "JBSWY3DP"))
        .await
        .unwrap()
        .unwrap()
        .outcome()
        .await
        .unwrap();

    assert_eq!(report.outcome, DeliveryOutcome::Abandoned);
    assert_eq!(report.attempts, 6);
    assert_eq!(link.attempts(), 6);

    // The store change stands even though the watch never heard about it.
    assert_eq!(companion.store().count(), 1);
}

#[tokio::test]
async fn test_abandoned_message_does_not_affect_next() {
    let dir = TempDir::new().unwrap();
    let (companion, link) =
        file_companion(&dir.path().join("store.json"), RetryPolicy::default());

    link.fail_always();
    let first = companion.on_ready(0).await.unwrap();
    assert_eq!(first.outcome().await.unwrap().outcome, DeliveryOutcome::Abandoned);

    link.recover();
    link.fail_next(2);
    let second = companion.on_ready(0).await.unwrap().outcome().await.unwrap();
    assert!(second.is_delivered());
    assert_eq!(second.attempts, 3);

    let stats = companion.channel().stats().await;
    assert_eq!(stats.queued, 2);
    assert_eq!(stats.delivered, 1);
    assert_eq!(stats.abandoned, 1);
    assert_eq!(stats.attempts, 9);
}

#[tokio::test]
async fn test_messages_arrive_in_event_order() {
    let dir = TempDir::new().unwrap();
    let (mut companion, link) =
        file_companion(&dir.path().join("store.json"), RetryPolicy::default());
    link.fail_next(3);

    let mut tickets = vec![companion.on_ready(60).await.unwrap()];
    for (label, secret) in [("A", "AAAA"), ("B", "BBBB")] {
        tickets.push(
            companion
                .on_webview_closed(&secret_response(label, secret))
                .await
                .unwrap()
                .unwrap(),
        );
    }

    let reports = futures::future::join_all(tickets.into_iter().map(|t| t.outcome())).await;
    assert!(reports.iter().all(|r| r.as_ref().unwrap().is_delivered()));
    assert_eq!(
        link.delivered(),
        vec![
            DeviceMessage::session_start(0, 0, 60),
            DeviceMessage::transmit_key("A:AAAA"),
            DeviceMessage::transmit_key("B:BBBB"),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_retry_delay_spaces_attempts() {
    let dir = TempDir::new().unwrap();
    let policy = RetryPolicy {
        max_retries: 2,
        retry_delay: Duration::from_secs(1),
    };
    let (companion, link) = file_companion(&dir.path().join("store.json"), policy);
    link.fail_always();

    let started = tokio::time::Instant::now();
    let report = companion.on_ready(0).await.unwrap().outcome().await.unwrap();

    assert_eq!(report.attempts, 3);
    assert!(started.elapsed() >= Duration::from_secs(2));
}
