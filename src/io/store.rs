//! Key-value persistence for presentation state.
//!
//! The engine never talks to a concrete storage backend. Column order,
//! group-expand maps and filters are written through [`KeyValueStore`], and
//! every read or write failure degrades to in-memory defaults.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::io::atomic_write_string;

const COLUMNS_PREFIX: &str = "table-columns-";
const GROUPS_PREFIX: &str = "table-groups-";
const FILTERS_PREFIX: &str = "table-filters-";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage IO error: {0}")]
    Io(#[from] io::Error),
    #[error("storage encode error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("storage quota exceeded ({used} of {limit} bytes)")]
    QuotaExceeded { used: usize, limit: usize },
    #[error("storage unavailable")]
    Unavailable,
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

pub type SharedStore = Arc<dyn KeyValueStore + Send + Sync>;

pub fn columns_key(key: &str) -> String {
    format!("{COLUMNS_PREFIX}{key}")
}

pub fn groups_key(key: &str) -> String {
    format!("{GROUPS_PREFIX}{key}")
}

pub fn filters_key(key: &str) -> String {
    format!("{FILTERS_PREFIX}{key}")
}

/// Reads and decodes a record. Missing or corrupt data reads as `None`.
pub fn load_json_record<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::debug!("ignoring unreadable record {key}: {err}");
            None
        }
    }
}

/// Encodes and writes a record. Failures are logged and dropped.
pub fn save_json_record<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(StoreError::from)
        .and_then(|raw| store.set(key, &raw));
    if let Err(err) = result {
        log::warn!("could not persist {key}: {err}");
    }
}

pub fn remove_record(store: &dyn KeyValueStore, key: &str) {
    if let Err(err) = store.remove(key) {
        log::warn!("could not remove {key}: {err}");
    }
}

/// Process-local store. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once keys and values exceed `limit`
    /// bytes in total.
    pub fn with_quota(limit: usize) -> Self {
        Self {
            quota: Some(limit),
            ..Self::default()
        }
    }

    pub fn shared(self) -> SharedStore {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.entries.lock().map_err(|_| StoreError::Unavailable)?;
        if let Some(limit) = self.quota {
            let used: usize = map
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum::<usize>()
                + key.len()
                + value.len();
            if used > limit {
                return Err(StoreError::QuotaExceeded { used, limit });
            }
        }
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self.entries.lock().map_err(|_| StoreError::Unavailable)?;
        map.remove(key);
        Ok(())
    }
}

/// All keys live in one JSON object file, rewritten atomically on change.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    log::debug!("store {} unreadable: {err}", self.path.display());
                }
                return BTreeMap::new();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|err| {
            log::debug!("store {} is corrupt, starting empty: {err}", self.path.display());
            BTreeMap::new()
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(entries)?;
        atomic_write_string(&self.path, &content)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all();
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all();
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}
