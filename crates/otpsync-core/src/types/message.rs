//! Device message payloads.
//!
//! Every message exchanged with the watch is a flat dictionary of string keys
//! to values. Outbound messages are built with the constructors on
//! [`DeviceMessage`]; inbound ones are classified with [`DeviceRequest`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Dictionary keys understood by the watch application.
pub mod keys {
    /// Number of stored secrets, sent at session start.
    pub const KEY_COUNT: &str = "key_count";
    /// Current theme id.
    pub const THEME: &str = "theme";
    /// Timezone offset in minutes west of UTC.
    pub const TIMEZONE: &str = "timezone";
    /// A `label:secret` record pushed to the watch.
    pub const TRANSMIT_KEY: &str = "transmit_key";
    /// Watch asks for the record at a 1-based position.
    pub const REQUEST_KEY: &str = "request_key";
    /// Secret to delete, in either direction.
    pub const DELETE_KEY: &str = "delete_key";
}

/// A flat key/value message to or from the watch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceMessage {
    payload: BTreeMap<String, Value>,
}

impl DeviceMessage {
    /// Create an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Session start announcement: secret count, theme and timezone.
    pub fn session_start(key_count: usize, theme: i64, timezone_offset: i32) -> Self {
        Self::new()
            .with(keys::KEY_COUNT, key_count)
            .with(keys::THEME, theme)
            .with(keys::TIMEZONE, timezone_offset)
    }

    /// Push one `label:secret` record.
    pub fn transmit_key(record: impl Into<String>) -> Self {
        Self::new().with(keys::TRANSMIT_KEY, record.into())
    }

    /// Confirm deletion of a secret.
    pub fn delete_key(fragment: impl Into<String>) -> Self {
        Self::new().with(keys::DELETE_KEY, fragment.into())
    }

    /// Add a field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a field, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.payload.insert(key.into(), value.into());
    }

    /// Get a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Check if a field is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.payload.contains_key(key)
    }

    /// Field names, for logging without exposing values.
    pub fn keys(&self) -> Vec<&str> {
        self.payload.keys().map(String::as_str).collect()
    }

    /// Check if the message has no fields.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Borrow the underlying dictionary.
    pub fn payload(&self) -> &BTreeMap<String, Value> {
        &self.payload
    }
}

impl From<BTreeMap<String, Value>> for DeviceMessage {
    fn from(payload: BTreeMap<String, Value>) -> Self {
        Self { payload }
    }
}

/// A classified inbound message from the watch.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceRequest {
    /// The watch wants the record at this 1-based position.
    RequestKey(i64),

    /// The watch deleted a secret locally and asks the phone to follow.
    DeleteKey(String),

    /// Anything else; logged and ignored.
    Unrecognized,
}

impl DeviceRequest {
    /// Classify an inbound message. `request_key` wins over `delete_key`.
    pub fn classify(message: &DeviceMessage) -> Self {
        if let Some(position) = message.get(keys::REQUEST_KEY).and_then(as_integer) {
            return Self::RequestKey(position);
        }
        match message.get(keys::DELETE_KEY) {
            Some(Value::String(fragment)) if !fragment.is_empty() => {
                Self::DeleteKey(fragment.clone())
            }
            _ => Self::Unrecognized,
        }
    }
}

/// Read an integer that may have been encoded as a number or numeric string.
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_start_fields() {
        let msg = DeviceMessage::session_start(3, 1, -120);
        assert_eq!(msg.get(keys::KEY_COUNT), Some(&json!(3)));
        assert_eq!(msg.get(keys::THEME), Some(&json!(1)));
        assert_eq!(msg.get(keys::TIMEZONE), Some(&json!(-120)));
        assert_eq!(msg.len(), 3);
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let msg = DeviceMessage::transmit_key("Work:JBSWY3DP");
        let text = serde_json::to_string(&msg).unwrap();
        assert_eq!(text, r#"{"transmit_key":"Work:JBSWY3DP"}"#);

        let parsed: DeviceMessage = serde_json::from_str(r#"{"request_key":2}"#).unwrap();
        assert_eq!(DeviceRequest::classify(&parsed), DeviceRequest::RequestKey(2));
    }

    #[test]
    fn test_classify() {
        let delete = DeviceMessage::delete_key("SECR2");
        assert_eq!(
            DeviceRequest::classify(&delete),
            DeviceRequest::DeleteKey("SECR2".to_string())
        );

        let both = DeviceMessage::new()
            .with(keys::REQUEST_KEY, "4")
            .with(keys::DELETE_KEY, "X");
        assert_eq!(DeviceRequest::classify(&both), DeviceRequest::RequestKey(4));

        let empty_delete = DeviceMessage::new().with(keys::DELETE_KEY, "");
        assert_eq!(DeviceRequest::classify(&empty_delete), DeviceRequest::Unrecognized);

        let other = DeviceMessage::new().with("ping", true);
        assert_eq!(DeviceRequest::classify(&other), DeviceRequest::Unrecognized);
    }

    #[test]
    fn test_as_integer() {
        assert_eq!(as_integer(&json!(7)), Some(7));
        assert_eq!(as_integer(&json!(2.0)), Some(2));
        assert_eq!(as_integer(&json!(2.5)), None);
        assert_eq!(as_integer(&json!(" 12 ")), Some(12));
        assert_eq!(as_integer(&json!("twelve")), None);
        assert_eq!(as_integer(&json!(null)), None);
    }
}
