//! JsonFileStore - a durable store kept as one JSON object on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use super::{KeyValueStore, StoreError};

/// Key-value store persisted to a single JSON file.
///
/// The whole map lives in memory; every `set` and `remove` rewrites the file
/// through a `.tmp` sibling followed by a rename, so a crash leaves either the
/// old or the new file behind, never a torn one.
///
/// Clone-friendly via Arc: every collection sharing one file must share one
/// handle, since each handle rewrites the whole file from its own map.
#[derive(Clone)]
pub struct JsonFileStore {
    inner: Arc<FileState>,
}

struct FileState {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading it if the file exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let bytes = fs::read(&path).map_err(|e| {
                StoreError::Io(format!("failed to read {}: {}", path.display(), e))
            })?;
            if bytes.is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_slice(&bytes).map_err(|e| {
                    StoreError::Serde(format!("failed to parse {}: {}", path.display(), e))
                })?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "opened file store");

        Ok(Self {
            inner: Arc::new(FileState {
                path,
                entries: RwLock::new(entries),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let path = self.path();
        let tmp_path = path.with_extension("tmp");
        let json = serde_json::to_vec_pretty(entries)
            .map_err(|e| StoreError::Serde(e.to_string()))?;

        fs::write(&tmp_path, json).map_err(|e| {
            StoreError::Io(format!("failed to write {}: {}", tmp_path.display(), e))
        })?;

        fs::rename(&tmp_path, path).map_err(|e| {
            StoreError::Io(format!(
                "failed to rename {} to {}: {}",
                tmp_path.display(),
                path.display(),
                e
            ))
        })?;

        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .inner
            .entries
            .read()
            .map_err(|_| StoreError::LockPoisoned("get"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .inner
            .entries
            .write()
            .map_err(|_| StoreError::LockPoisoned("set"))?;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self
            .inner
            .entries
            .write()
            .map_err(|_| StoreError::LockPoisoned("remove"))?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.flush(&entries)
    }
}
