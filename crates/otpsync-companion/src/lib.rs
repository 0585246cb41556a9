//! Companion session for the otpsync watch app.
//!
//! A [`Companion`] reacts to the events the phone platform raises (watch app
//! ready, inbound watch message, configuration page closed), keeps the
//! [`SecretStore`](otpsync_store::SecretStore) in step, and pushes the
//! resulting messages through a [`SyncChannel`](otpsync_channels::SyncChannel).

pub mod companion;
pub mod error;
pub mod webview;

pub use companion::Companion;
pub use error::{CompanionError, Result};
pub use webview::{configuration_url, ConfigurationResponse};
