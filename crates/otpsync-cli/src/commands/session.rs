//! Commands that replay one companion event.
//!
//! Every command opens the store, applies the event, waits for the resulting
//! message to be delivered over the stdout link and then drains the queue.

use anyhow::Context;
use otpsync_channels::{DeliveryTicket, DeviceLink, JsonLinesLink, SyncChannel};
use otpsync_companion::Companion;
use otpsync_core::config::Config;
use otpsync_core::types::{keys, DeviceMessage};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

struct Session {
    companion: Companion,
}

impl Session {
    fn open(config: &Config, store: Option<&Path>) -> anyhow::Result<Self> {
        let store = super::open_store(config, store)?;
        let link: Arc<dyn DeviceLink> = Arc::new(JsonLinesLink::stdout());
        let channel = SyncChannel::from_config(link, &config.delivery);

        Ok(Self {
            companion: Companion::new(store, channel, config.webview.clone()),
        })
    }

    /// Wait for `ticket`, then shut the queue down.
    async fn finish(self, ticket: Option<DeliveryTicket>) -> anyhow::Result<()> {
        let report = match ticket {
            Some(ticket) => Some(ticket.outcome().await?),
            None => None,
        };
        self.companion.shutdown().await;

        match report {
            Some(report) if report.is_delivered() => {
                info!(id = %report.id, attempts = report.attempts, "message delivered");
                Ok(())
            }
            Some(report) => anyhow::bail!(
                "Message abandoned after {} attempt(s): {}",
                report.attempts,
                report.last_error.unwrap_or_default()
            ),
            None => {
                info!("nothing to send");
                Ok(())
            }
        }
    }
}

/// Announce the store to the watch.
pub async fn ready(
    config: &Config,
    store: Option<&Path>,
    timezone: Option<i32>,
) -> anyhow::Result<()> {
    let session = Session::open(config, store)?;
    let timezone = timezone.unwrap_or_else(otpsync_core::time::local_timezone_offset);
    let ticket = session.companion.on_ready(timezone).await?;
    session.finish(Some(ticket)).await
}

/// Add or relabel a secret as if submitted from the configuration page.
pub async fn add(
    config: &Config,
    store: Option<&Path>,
    label: &str,
    secret: &str,
) -> anyhow::Result<()> {
    let response = serde_json::json!({ "label": label, "secret": secret }).to_string();

    let mut session = Session::open(config, store)?;
    let ticket = session.companion.on_webview_closed(&response).await?;
    if ticket.is_none() {
        session.finish(None).await?;
        anyhow::bail!("Secret was not stored; see the log for the reason");
    }
    session.finish(ticket).await
}

/// Apply a configuration page response.
pub async fn configure(
    config: &Config,
    store: Option<&Path>,
    response: &str,
) -> anyhow::Result<()> {
    let mut session = Session::open(config, store)?;
    let ticket = session.companion.on_webview_closed(response).await?;
    session.finish(ticket).await
}

/// Handle a JSON message from the watch.
pub async fn device(
    config: &Config,
    store: Option<&Path>,
    message: &str,
) -> anyhow::Result<()> {
    let message: DeviceMessage =
        serde_json::from_str(message).context("Device message must be a JSON object")?;

    let mut session = Session::open(config, store)?;
    let ticket = session.companion.on_device_message(&message).await?;
    session.finish(ticket).await
}

/// Delete a secret as if the watch had requested it.
pub async fn delete(
    config: &Config,
    store: Option<&Path>,
    fragment: &str,
) -> anyhow::Result<()> {
    if fragment.is_empty() {
        anyhow::bail!("Fragment must not be empty");
    }
    let message = DeviceMessage::new().with(keys::DELETE_KEY, fragment);

    let mut session = Session::open(config, store)?;
    let ticket = session.companion.on_device_message(&message).await?;
    session.finish(ticket).await
}
