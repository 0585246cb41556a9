//! Key-value storage backends.
//!
//! Defines the [`KvStore`] trait and two implementations: [`MemoryKvStore`]
//! for tests and throwaway sessions, and [`FileKvStore`], which keeps the whole
//! namespace in one JSON document and replaces it atomically on every batch.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, StoreError};

/// A single mutation inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Set `key` to `value`.
    Set(String, String),
    /// Remove `key` if present.
    Remove(String),
}

/// An ordered group of writes applied all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a set.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ops.push(WriteOp::Set(key.into(), value.into()));
        self
    }

    /// Queue a removal.
    pub fn remove(mut self, key: impl Into<String>) -> Self {
        self.ops.push(WriteOp::Remove(key.into()));
        self
    }

    /// The queued operations, in order.
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Check if the batch has no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Apply the operations to an in-memory map.
    fn apply_to(&self, map: &mut BTreeMap<String, String>) {
        for op in &self.ops {
            match op {
                WriteOp::Set(key, value) => {
                    map.insert(key.clone(), value.clone());
                }
                WriteOp::Remove(key) => {
                    map.remove(key);
                }
            }
        }
    }
}

/// Synchronous string key-value storage.
///
/// Implementations must apply a batch atomically: after a crash either every
/// operation in the batch is visible or none is.
pub trait KvStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Apply a batch of writes atomically.
    fn apply(&mut self, batch: WriteBatch) -> Result<()>;

    /// Set a single key.
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(WriteBatch::new().set(key, value))
    }

    /// Remove a single key.
    fn remove(&mut self, key: &str) -> Result<()> {
        self.apply(WriteBatch::new().remove(key))
    }
}

/// An in-memory key-value store.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    values: BTreeMap<String, String>,
}

impl MemoryKvStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `pairs`.
    pub fn with_values<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Snapshot of every stored pair.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.values.clone()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn apply(&mut self, batch: WriteBatch) -> Result<()> {
        batch.apply_to(&mut self.values);
        Ok(())
    }
}

/// A file-backed key-value store.
///
/// The namespace is held in memory and mirrored to a single JSON object at
/// `path`. Each batch is written to `{path}.tmp` and renamed over the
/// original, so a crash mid-write leaves the previous document intact. The
/// file is created with mode `0600` on Unix.
#[derive(Debug)]
pub struct FileKvStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileKvStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            if data.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&data).map_err(|e| {
                    StoreError::Corrupt(format!("{}: {}", path.display(), e))
                })?
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), keys = values.len(), "opened key-value store");
        Ok(Self { path, values })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(values)?;
        let temp_path = self.path.with_extension("tmp");
        write_private_file(&temp_path, json.as_bytes())?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn apply(&mut self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut next = self.values.clone();
        batch.apply_to(&mut next);
        self.persist(&next)?;

        debug!(path = %self.path.display(), ops = batch.ops().len(), "applied write batch");
        self.values = next;
        Ok(())
    }
}

/// Write `data` to `path` with mode 0600 on Unix.
fn write_private_file(path: &Path, data: &[u8]) -> Result<()> {
    std::fs::write(path, data)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)?;
    }

    Ok(())
}
