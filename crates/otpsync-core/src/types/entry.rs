//! Secret entry types.

use crate::error::Error;
use crate::secret::OtpSecret;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of secrets the watch can hold.
pub const MAX_OTP: usize = 16;

/// Longest normalized secret the watch accepts.
pub const MAX_SECRET_LEN: usize = 64;

/// Label buffer size on the watch, in characters.
pub const MAX_LABEL_LEN: usize = 6;

/// Separator between label and secret in the stored and wire form.
pub const PAIR_SEPARATOR: char = ':';

/// How an incoming secret is matched against stored entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// A stored entry matches when its `label:secret` text contains the
    /// candidate secret anywhere. Compatible with existing phone stores, but
    /// a short secret can match a longer unrelated one.
    #[default]
    Substring,

    /// A stored entry matches only when its normalized secret is identical.
    Exact,
}

/// One labeled OTP credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretEntry {
    /// Display name.
    pub label: String,

    /// Normalized shared secret.
    pub secret: OtpSecret,
}

impl SecretEntry {
    /// Build an entry from user input, normalizing the secret.
    pub fn new(label: impl Into<String>, raw_secret: &str) -> Result<Self, Error> {
        let entry = Self {
            label: label.into(),
            secret: OtpSecret::new(raw_secret),
        };
        entry.validate()?;
        Ok(entry)
    }

    /// Parse a stored `label:secret` record.
    ///
    /// The secret is everything after the last separator, so labels may
    /// themselves contain a colon.
    pub fn from_wire(record: &str) -> Result<Self, Error> {
        let (label, secret) = record.rsplit_once(PAIR_SEPARATOR).ok_or_else(|| {
            Error::InvalidEntry(format!("record has no '{PAIR_SEPARATOR}' separator"))
        })?;
        Ok(Self {
            label: label.to_string(),
            secret: OtpSecret::from_stored(secret),
        })
    }

    /// The `label:secret` form stored on the phone and sent to the watch.
    pub fn to_wire(&self) -> String {
        format!("{}{}{}", self.label, PAIR_SEPARATOR, self.secret.expose_secret())
    }

    /// Check whether this stored entry matches `secret` under `policy`.
    pub fn matches(&self, secret: &OtpSecret, policy: MatchPolicy) -> bool {
        match policy {
            MatchPolicy::Substring => self.to_wire().contains(secret.expose_secret()),
            MatchPolicy::Exact => self.secret == *secret,
        }
    }

    /// Check whether the stored record text contains `fragment`.
    pub fn contains(&self, fragment: &str) -> bool {
        self.to_wire().contains(fragment)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.label.trim().is_empty() {
            return Err(Error::InvalidEntry("label must not be empty".to_string()));
        }
        if self.secret.is_empty() {
            return Err(Error::InvalidEntry("secret must not be empty".to_string()));
        }
        if self.secret.expose_secret().contains(PAIR_SEPARATOR) {
            return Err(Error::InvalidEntry(format!(
                "secret must not contain '{PAIR_SEPARATOR}'"
            )));
        }
        if self.secret.len() > MAX_SECRET_LEN {
            return Err(Error::InvalidEntry(format!(
                "secret exceeds maximum length of {MAX_SECRET_LEN} characters"
            )));
        }
        if self.label.chars().count() > MAX_LABEL_LEN {
            tracing::warn!(
                label = %self.label,
                max = MAX_LABEL_LEN,
                "label is longer than the watch label buffer"
            );
        }
        Ok(())
    }
}

impl fmt::Display for SecretEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.label, PAIR_SEPARATOR, self.secret)
    }
}
