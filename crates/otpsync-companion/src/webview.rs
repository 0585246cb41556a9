//! Configuration page round trip.

use otpsync_core::config::WebviewConfig;
use otpsync_core::types::as_integer;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::Result;

/// Response text the platform reports when the page was dismissed.
const CANCELLED: &str = "CANCELLED";

/// Build the configuration page URL for a store holding `otp_count` secrets.
pub fn configuration_url(config: &WebviewConfig, otp_count: usize) -> Result<Url> {
    let mut url = Url::parse(&config.url)?;
    url.query_pairs_mut()
        .append_pair("version", &config.app_version.to_string())
        .append_pair("otp_count", &otp_count.to_string());
    Ok(url)
}

/// The JSON document returned by the configuration page.
///
/// Every field is optional and loosely typed. `theme` is accepted as a
/// number or a numeric string. `label` and `secret` are accepted as strings
/// or numbers. Any other value is treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigurationResponse {
    #[serde(default)]
    theme: Option<Value>,

    #[serde(default)]
    label: Option<Value>,

    #[serde(default)]
    secret: Option<Value>,
}

impl ConfigurationResponse {
    /// Parse a response. Returns `None` when the page was closed without
    /// submitting anything.
    pub fn parse(response: &str) -> Result<Option<Self>> {
        let response = response.trim();
        if response.is_empty() || response == CANCELLED {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(response)?))
    }

    /// Requested theme, if the page sent a numeric one.
    pub fn theme(&self) -> Option<i64> {
        self.theme.as_ref().and_then(as_integer)
    }

    /// Label and raw secret, when both are present and non-empty.
    pub fn secret_pair(&self) -> Option<(String, String)> {
        let label = self.label.as_ref().and_then(as_text)?;
        let secret = self.secret.as_ref().and_then(as_text)?;
        if label.is_empty() || secret.is_empty() {
            return None;
        }
        Some((label, secret))
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
