//! Event handlers for one companion session.

use otpsync_channels::{DeliveryTicket, SyncChannel};
use otpsync_core::config::WebviewConfig;
use otpsync_core::types::{keys, DeviceMessage, DeviceRequest};
use otpsync_store::{AddOutcome, DeleteOutcome, SecretStore, StoreError};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::error::Result;
use crate::webview::{configuration_url, ConfigurationResponse};

/// Phone-side session state: the secret store and the outbound queue.
///
/// Handlers take `&mut self`, so events are applied one at a time in the
/// order the platform raises them. Each handler returns the
/// [`DeliveryTicket`] of the message it queued, or `None` when nothing was
/// sent.
#[derive(Debug)]
pub struct Companion {
    store: SecretStore,
    channel: SyncChannel,
    webview: WebviewConfig,
}

impl Companion {
    /// Create a session over an opened store.
    pub fn new(store: SecretStore, channel: SyncChannel, webview: WebviewConfig) -> Self {
        Self {
            store,
            channel,
            webview,
        }
    }

    /// The secret store.
    pub fn store(&self) -> &SecretStore {
        &self.store
    }

    /// The outbound queue.
    pub fn channel(&self) -> &SyncChannel {
        &self.channel
    }

    /// The watch app started: announce count, theme and timezone.
    ///
    /// `timezone_offset` is in minutes west of UTC.
    pub async fn on_ready(&self, timezone_offset: i32) -> Result<DeliveryTicket> {
        info!(
            count = self.store.count(),
            theme = self.store.theme(),
            timezone_offset,
            "watch app ready"
        );
        let message =
            DeviceMessage::session_start(self.store.count(), self.store.theme(), timezone_offset);
        Ok(self.channel.send(message).await?)
    }

    /// Handle a message from the watch.
    pub async fn on_device_message(
        &mut self,
        message: &DeviceMessage,
    ) -> Result<Option<DeliveryTicket>> {
        match DeviceRequest::classify(message) {
            DeviceRequest::RequestKey(position) => self.send_key(position).await,
            DeviceRequest::DeleteKey(fragment) => self.confirm_delete(&fragment).await.map(Some),
            DeviceRequest::Unrecognized => {
                debug!(fields = ?message.keys(), "ignoring unrecognized watch message");
                Ok(None)
            }
        }
    }

    /// URL of the configuration page for the current store.
    pub fn configuration_url(&self) -> Result<Url> {
        configuration_url(&self.webview, self.store.count())
    }

    /// Apply the configuration page's response.
    ///
    /// A changed theme is persisted and a submitted `label`/`secret` pair is
    /// added or relabeled. Everything the watch needs to learn is sent as a
    /// single message. A dismissed page, or a response that changes nothing,
    /// sends nothing.
    pub async fn on_webview_closed(&mut self, response: &str) -> Result<Option<DeliveryTicket>> {
        let Some(response) = ConfigurationResponse::parse(response)? else {
            debug!("configuration page dismissed");
            return Ok(None);
        };

        let mut delta = DeviceMessage::new();

        if let Some(theme) = response.theme() {
            if self.store.set_theme(theme)? {
                info!(theme, "theme changed");
                delta.insert(keys::THEME, theme);
            }
        }

        // A store failure on the secret still lets an already persisted theme
        // reach the watch; the failure is reported after the flush.
        let mut failure = None;
        if let Some((label, secret)) = response.secret_pair() {
            match self.store.add(&label, &secret) {
                Ok(added) => {
                    match added.outcome {
                        AddOutcome::Added => info!(index = added.index, "uploading new secret"),
                        AddOutcome::Relabeled => {
                            info!(index = added.index, "secret exists, updating label")
                        }
                    }
                    delta.insert(keys::TRANSMIT_KEY, added.transmit_record());
                }
                Err(StoreError::CapacityExceeded { capacity }) => {
                    warn!(capacity, "too many secrets, not uploading");
                }
                Err(StoreError::InvalidEntry(reason)) => {
                    warn!(%reason, "rejected secret from configuration page");
                }
                Err(e) => {
                    error!(error = %e, "failed to store secret from configuration page");
                    failure = Some(e);
                }
            }
        }

        if delta.is_empty() {
            return match failure {
                Some(e) => Err(e.into()),
                None => {
                    debug!("configuration produced no changes");
                    Ok(None)
                }
            };
        }

        debug!(fields = ?delta.keys(), "uploading configuration");
        let ticket = self.channel.send(delta).await?;
        match failure {
            Some(e) => Err(e.into()),
            None => Ok(Some(ticket)),
        }
    }

    /// Stop the outbound queue once everything queued has been delivered.
    pub async fn shutdown(self) {
        self.channel.shutdown().await;
    }

    async fn send_key(&self, position: i64) -> Result<Option<DeliveryTicket>> {
        match self.store.lookup(position) {
            Ok(entry) => {
                debug!(position, label = %entry.label, "sending requested secret");
                let message = DeviceMessage::transmit_key(entry.to_wire());
                Ok(Some(self.channel.send(message).await?))
            }
            Err(StoreError::NotFound(_)) => {
                warn!(position, count = self.store.count(), "watch requested missing secret");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The watch already deleted its copy, so it gets a confirmation even
    /// when the phone had nothing to remove.
    async fn confirm_delete(&mut self, fragment: &str) -> Result<DeliveryTicket> {
        match self.store.delete_by_secret(fragment)? {
            DeleteOutcome::Deleted { index, .. } => {
                info!(index, count = self.store.count(), "deleted secret on watch request")
            }
            DeleteOutcome::NotFound => warn!("watch deleted a secret the phone does not hold"),
        }
        Ok(self.channel.send(DeviceMessage::delete_key(fragment)).await?)
    }
}
