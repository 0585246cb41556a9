//! Message delivery queue and retry driver.

use crate::error::ChannelError;
use crate::link::DeviceLink;
use crate::pending::{PendingSend, Transition};
use crate::Result;
use otpsync_core::config::DeliveryConfig;
use otpsync_core::types::DeviceMessage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Retry behaviour for outbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Re-sends allowed after the first failed attempt.
    pub max_retries: u32,

    /// Pause before each re-send. Zero re-sends immediately.
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_delay: Duration::ZERO,
        }
    }
}

impl From<&DeliveryConfig> for RetryPolicy {
    fn from(config: &DeliveryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Terminal result of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOutcome {
    /// The watch acknowledged the message.
    Delivered,

    /// Every attempt failed and the message was dropped.
    Abandoned,
}

/// Report produced when a delivery finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryReport {
    /// Delivery ID.
    pub id: String,

    /// Terminal outcome.
    pub outcome: DeliveryOutcome,

    /// Attempts made, including the first.
    pub attempts: u32,

    /// Error from the last failed attempt, if any.
    pub last_error: Option<String>,
}

impl DeliveryReport {
    /// Check if the message reached the watch.
    pub fn is_delivered(&self) -> bool {
        self.outcome == DeliveryOutcome::Delivered
    }
}

/// Drive one message through the retry state machine until it is delivered
/// or abandoned.
///
/// Failures are never returned as errors: they are retried up to the policy
/// bound and then reported as [`DeliveryOutcome::Abandoned`].
pub async fn deliver(
    link: &dyn DeviceLink,
    policy: &RetryPolicy,
    message: DeviceMessage,
) -> DeliveryReport {
    let mut pending = PendingSend::new(message, policy.max_retries);

    loop {
        pending.begin_attempt();

        match link.send(pending.message()).await {
            Ok(receipt) => {
                pending.on_success();
                debug!(
                    id = pending.id(),
                    link = link.link_id(),
                    transaction_id = receipt.transaction_id,
                    attempts = pending.attempts(),
                    "Successfully delivered message"
                );
                return DeliveryReport {
                    id: pending.id().to_string(),
                    outcome: DeliveryOutcome::Delivered,
                    attempts: pending.attempts(),
                    last_error: pending.last_error().map(str::to_string),
                };
            }
            Err(e) => match pending.on_failure(&e) {
                Transition::Retry { retry } => {
                    warn!(
                        id = pending.id(),
                        link = link.link_id(),
                        retry,
                        max_retries = policy.max_retries,
                        "Unable to deliver message, retrying: {}",
                        e
                    );
                    if !policy.retry_delay.is_zero() {
                        tokio::time::sleep(policy.retry_delay).await;
                    }
                }
                Transition::Abandon => {
                    error!(
                        id = pending.id(),
                        link = link.link_id(),
                        attempts = pending.attempts(),
                        "All retries failed, dropping message: {}",
                        e
                    );
                    return DeliveryReport {
                        id: pending.id().to_string(),
                        outcome: DeliveryOutcome::Abandoned,
                        attempts: pending.attempts(),
                        last_error: pending.last_error().map(str::to_string),
                    };
                }
            },
        }
    }
}

/// Handle to the outcome of a queued message.
#[derive(Debug)]
pub struct DeliveryTicket {
    rx: oneshot::Receiver<DeliveryReport>,
}

impl DeliveryTicket {
    /// Wait for the delivery to finish.
    ///
    /// Dropping the ticket instead is fine: the message is still delivered.
    pub async fn outcome(self) -> Result<DeliveryReport> {
        self.rx.await.map_err(|_| ChannelError::QueueClosed)
    }
}

/// Delivery counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryStats {
    /// Messages accepted into the queue.
    pub queued: u64,

    /// Messages acknowledged by the watch.
    pub delivered: u64,

    /// Messages dropped after exhausting retries.
    pub abandoned: u64,

    /// Attempts made across all messages.
    pub attempts: u64,
}

struct Job {
    message: DeviceMessage,
    reply: oneshot::Sender<DeliveryReport>,
}

/// Ordered outbound queue to the watch.
///
/// Messages are delivered one at a time in the order they were sent, each
/// with its own retry accounting. The worker task runs until every
/// `SyncChannel` clone is dropped or [`SyncChannel::shutdown`] is called;
/// either way messages already queued are still delivered.
#[derive(Clone)]
pub struct SyncChannel {
    tx: mpsc::Sender<Job>,
    close: Arc<watch::Sender<bool>>,
    stats: Arc<RwLock<DeliveryStats>>,
    worker: Arc<parking_lot::Mutex<Option<JoinHandle<()>>>>,
}

impl std::fmt::Debug for SyncChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncChannel")
            .field("capacity", &self.tx.max_capacity())
            .finish()
    }
}

impl SyncChannel {
    /// Start the delivery worker. Must be called inside a Tokio runtime.
    pub fn start(link: Arc<dyn DeviceLink>, policy: RetryPolicy, queue_size: usize) -> Self {
        let (tx, rx) = mpsc::channel(queue_size.max(1));
        let (close, closed) = watch::channel(false);
        let stats = Arc::new(RwLock::new(DeliveryStats::default()));
        let worker = tokio::spawn(run_worker(link, policy, rx, closed, stats.clone()));

        Self {
            tx,
            close: Arc::new(close),
            stats,
            worker: Arc::new(parking_lot::Mutex::new(Some(worker))),
        }
    }

    /// Start the delivery worker from configuration.
    pub fn from_config(link: Arc<dyn DeviceLink>, config: &DeliveryConfig) -> Self {
        Self::start(link, RetryPolicy::from(config), config.queue_size)
    }

    /// Queue a message for delivery.
    ///
    /// Returns as soon as the message is queued. Waits for room when the
    /// queue is full.
    pub async fn send(&self, message: DeviceMessage) -> Result<DeliveryTicket> {
        let (reply, rx) = oneshot::channel();
        let fields = message.keys().join(",");

        self.tx
            .send(Job { message, reply })
            .await
            .map_err(|_| ChannelError::QueueClosed)?;
        self.stats.write().await.queued += 1;

        debug!(fields = %fields, "queued message for watch");
        Ok(DeliveryTicket { rx })
    }

    /// Current counters.
    pub async fn stats(&self) -> DeliveryStats {
        self.stats.read().await.clone()
    }

    /// Stop accepting messages and wait for the queue to drain.
    ///
    /// Every clone sees [`ChannelError::QueueClosed`] on later sends.
    pub async fn shutdown(self) {
        self.close.send_replace(true);
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                error!("delivery worker panicked: {}", e);
            }
        }
    }
}

async fn run_worker(
    link: Arc<dyn DeviceLink>,
    policy: RetryPolicy,
    mut rx: mpsc::Receiver<Job>,
    mut closed: watch::Receiver<bool>,
    stats: Arc<RwLock<DeliveryStats>>,
) {
    debug!(link = link.link_id(), ?policy, "delivery worker started");

    loop {
        let job = tokio::select! {
            biased;
            job = rx.recv() => job,
            _ = closed.changed() => {
                // Refuse new messages but drain what is already queued.
                rx.close();
                rx.recv().await
            }
        };
        let Some(job) = job else { break };

        let report = deliver(link.as_ref(), &policy, job.message).await;

        {
            let mut stats = stats.write().await;
            stats.attempts += u64::from(report.attempts);
            match report.outcome {
                DeliveryOutcome::Delivered => stats.delivered += 1,
                DeliveryOutcome::Abandoned => stats.abandoned += 1,
            }
        }

        // The sender may have dropped its ticket; the report is then unused.
        let _ = job.reply.send(report);
    }

    debug!(link = link.link_id(), "delivery worker stopped");
}
