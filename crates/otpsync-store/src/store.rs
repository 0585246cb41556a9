//! The bounded, ordered OTP secret store.

use otpsync_core::types::{MatchPolicy, SecretEntry, MAX_OTP};
use otpsync_core::OtpSecret;
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::kv::{KvStore, WriteBatch};

/// Storage key holding the number of occupied slots.
pub const COUNT_KEY: &str = "otp_count";

/// Storage key for the slot at 0-based `index`.
pub fn slot_key(index: usize) -> String {
    format!("secret_pair{index}")
}

/// What [`SecretStore::add`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new slot was appended.
    Added,
    /// An existing slot matched and was overwritten with the new pair.
    Relabeled,
}

/// Result of a successful [`SecretStore::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddResult {
    /// Whether the entry was appended or replaced an existing one.
    pub outcome: AddOutcome,
    /// 0-based slot that now holds the entry.
    pub index: usize,
    /// The stored entry.
    pub entry: SecretEntry,
}

impl AddResult {
    /// The `label:secret` record the watch must receive.
    pub fn transmit_record(&self) -> String {
        self.entry.to_wire()
    }
}

/// Result of [`SecretStore::delete_by_secret`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The entry at `index` was removed and later slots shifted left.
    Deleted { index: usize, entry: SecretEntry },
    /// No occupied slot contained the fragment; nothing changed.
    NotFound,
}

/// Ordered collection of up to [`MAX_OTP`] secrets backed by a [`KvStore`].
///
/// Slots `0..count` are always populated with no gaps. The persisted count is
/// the only authority for the occupied range: records at or beyond it are
/// never read. State is loaded once in [`SecretStore::open`] and served from
/// memory afterwards.
pub struct SecretStore {
    kv: Box<dyn KvStore>,
    entries: Vec<SecretEntry>,
    pub(crate) theme: i64,
    policy: MatchPolicy,
}

impl std::fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretStore")
            .field("count", &self.entries.len())
            .field("theme", &self.theme)
            .field("policy", &self.policy)
            .finish()
    }
}

impl SecretStore {
    /// Load the store from `kv`.
    ///
    /// A missing or unreadable count loads as an empty store. A count above
    /// [`MAX_OTP`] is clamped. A missing or malformed record inside the
    /// occupied range is reported as [`StoreError::Corrupt`].
    pub fn open(kv: Box<dyn KvStore>, policy: MatchPolicy) -> Result<Self> {
        let count = match kv.get(COUNT_KEY)? {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(count) => count,
                Err(_) => {
                    warn!(value = %raw, "unreadable {COUNT_KEY}, treating store as empty");
                    0
                }
            },
            None => 0,
        };
        let count = if count > MAX_OTP {
            warn!(count, max = MAX_OTP, "stored count exceeds capacity, clamping");
            MAX_OTP
        } else {
            count
        };

        let mut entries = Vec::with_capacity(count);
        for index in 0..count {
            let key = slot_key(index);
            let record = kv
                .get(&key)?
                .ok_or_else(|| StoreError::Corrupt(format!("{key} missing with count {count}")))?;
            let entry = SecretEntry::from_wire(&record)
                .map_err(|e| StoreError::Corrupt(format!("{key}: {e}")))?;
            entries.push(entry);
        }

        let theme = crate::settings::load_theme(kv.as_ref())?;

        debug!(count, theme, ?policy, "loaded secret store");
        Ok(Self {
            kv,
            entries,
            theme,
            policy,
        })
    }

    /// Number of occupied slots.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Check if no secrets are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_OTP
    }

    /// The occupied slots in order.
    pub fn entries(&self) -> &[SecretEntry] {
        &self.entries
    }

    /// Identity policy in effect.
    pub fn match_policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Add a secret, or relabel the entry that already holds it.
    ///
    /// The raw secret is normalized first. If an occupied slot matches under
    /// the store's [`MatchPolicy`], the first such slot is overwritten with
    /// the new pair. Otherwise the pair is appended, or
    /// [`StoreError::CapacityExceeded`] is returned with the store unchanged.
    pub fn add(&mut self, label: &str, raw_secret: &str) -> Result<AddResult> {
        let entry = SecretEntry::new(label, raw_secret)?;

        if let Some(index) = self.find_match(&entry.secret) {
            self.kv
                .apply(WriteBatch::new().set(slot_key(index), entry.to_wire()))?;
            self.entries[index] = entry.clone();
            info!(index, label = %entry.label, "relabeled existing secret");
            return Ok(AddResult {
                outcome: AddOutcome::Relabeled,
                index,
                entry,
            });
        }

        if self.is_full() {
            warn!(count = self.count(), max = MAX_OTP, "too many secrets, rejecting add");
            return Err(StoreError::CapacityExceeded { capacity: MAX_OTP });
        }

        let index = self.entries.len();
        self.kv.apply(
            WriteBatch::new()
                .set(slot_key(index), entry.to_wire())
                .set(COUNT_KEY, (index + 1).to_string()),
        )?;
        self.entries.push(entry.clone());
        info!(index, label = %entry.label, "added new secret");

        Ok(AddResult {
            outcome: AddOutcome::Added,
            index,
            entry,
        })
    }

    /// Delete the first entry whose stored `label:secret` text contains
    /// `fragment`, shifting every later slot one position left.
    ///
    /// The vacated last slot is cleared and the count decremented in the same
    /// batch. When nothing matches the store is left untouched.
    pub fn delete_by_secret(&mut self, fragment: &str) -> Result<DeleteOutcome> {
        let Some(index) = self.entries.iter().position(|e| e.contains(fragment)) else {
            debug!("no stored secret matches delete request");
            return Ok(DeleteOutcome::NotFound);
        };

        let last = self.entries.len() - 1;
        let mut batch = WriteBatch::new();
        for slot in index..last {
            batch = batch.set(slot_key(slot), self.entries[slot + 1].to_wire());
        }
        batch = batch
            .remove(slot_key(last))
            .set(COUNT_KEY, last.to_string());

        self.kv.apply(batch)?;
        let entry = self.entries.remove(index);
        info!(index, label = %entry.label, count = self.entries.len(), "deleted secret");

        Ok(DeleteOutcome::Deleted { index, entry })
    }

    /// Look up the entry at a 1-based `position`, as numbered on the watch.
    pub fn lookup(&self, position: i64) -> Result<&SecretEntry> {
        usize::try_from(position)
            .ok()
            .and_then(|p| p.checked_sub(1))
            .and_then(|index| self.entries.get(index))
            .ok_or(StoreError::NotFound(position))
    }

    pub(crate) fn kv_mut(&mut self) -> &mut dyn KvStore {
        self.kv.as_mut()
    }

    fn find_match(&self, secret: &OtpSecret) -> Option<usize> {
        self.entries
            .iter()
            .position(|stored| stored.matches(secret, self.policy))
    }
}
