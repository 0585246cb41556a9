//! OTP shared-secret handling.
//!
//! Secrets are entered by hand in the configuration page, so they arrive with
//! spaces, stray `+` signs, lowercase letters and the digits `0`/`1` that base32
//! does not use. [`normalize`] folds all of that into the canonical form stored
//! on the phone and the watch.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Normalize raw secret text into canonical base32 form.
///
/// Uppercases, maps `0` to `O` and `1` to `I`, and strips whitespace and `+`.
/// Normalizing an already normalized string is a no-op.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '+')
        .flat_map(char::to_uppercase)
        .map(|c| match c {
            '0' => 'O',
            '1' => 'I',
            other => other,
        })
        .collect()
}

/// A normalized OTP secret that is zeroed on drop.
///
/// Debug and Display both emit `[REDACTED]` so entries can be logged safely.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct OtpSecret {
    inner: String,
}

impl OtpSecret {
    /// Create a secret from raw user input, normalizing it.
    pub fn new(raw: &str) -> Self {
        Self {
            inner: normalize(raw),
        }
    }

    /// Wrap secret text read back from storage without re-normalizing it.
    ///
    /// Stored records are compared and deleted by their exact text, so they
    /// must round-trip unchanged even if written by an older companion.
    pub fn from_stored(text: impl Into<String>) -> Self {
        Self { inner: text.into() }
    }

    /// Expose the normalized secret text.
    ///
    /// Use sparingly - only when building wire or storage records.
    pub fn expose_secret(&self) -> &str {
        &self.inner
    }

    /// Check if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get the length of the secret in characters.
    pub fn len(&self) -> usize {
        self.inner.chars().count()
    }
}

impl PartialEq for OtpSecret {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for OtpSecret {}

// Never print secrets
impl fmt::Debug for OtpSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for OtpSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<&str> for OtpSecret {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
