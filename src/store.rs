//! Persistence of the slot collection
//!
//! [`KeyValueStore`] is the storage boundary: a synchronous string store
//! addressed by key. [`SlotStore`] layers the slot collection on top of it
//! under a single key, and [`SlotPersistence`] is the load/save interface the
//! controller is given.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, error, warn};

use crate::slots::SlotCollection;

/// Key the collection is stored under
pub const DOCUMENTS_KEY: &str = "documents";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },
}

/// Synchronous get/set-by-key store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Stores each key as `<root>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.key_path(key), value)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryEntries {
    values: HashMap<String, String>,
    quota: Option<usize>,
    writes: usize,
}

/// In-memory store. Clones share the same entries, so a test can keep a
/// handle while the controller owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    inner: Rc<RefCell<MemoryEntries>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects any write whose value is longer than `quota` bytes
    pub fn with_quota(quota: usize) -> Self {
        let store = Self::default();
        store.inner.borrow_mut().quota = Some(quota);
        store
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.inner.borrow().writes
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().values.get(key).cloned()
    }

    pub fn insert_raw(&self, key: &str, value: impl Into<String>) {
        self.inner
            .borrow_mut()
            .values
            .insert(key.to_string(), value.into());
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.raw(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.borrow_mut();
        if let Some(quota) = inner.quota {
            if value.len() > quota {
                return Err(StoreError::QuotaExceeded {
                    needed: value.len(),
                    quota,
                });
            }
        }
        inner.values.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }
}

/// Load/save interface for the slot collection
pub trait SlotPersistence {
    /// `None` when nothing is stored or the stored value is unusable
    fn load(&self) -> Option<SlotCollection>;
    fn save(&mut self, collection: &SlotCollection) -> Result<(), StoreError>;
}

/// Slot collection serialized as JSON under [`DOCUMENTS_KEY`]
#[derive(Debug, Clone)]
pub struct SlotStore<K> {
    kv: K,
}

impl<K: KeyValueStore> SlotStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }
}

impl<K: KeyValueStore> SlotPersistence for SlotStore<K> {
    fn load(&self) -> Option<SlotCollection> {
        let raw = match self.kv.get(DOCUMENTS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!("Failed to read stored documents: {e}");
                return None;
            }
        };
        // A length other than SLOT_COUNT fails here too, since the slots are a fixed array
        match serde_json::from_str::<SlotCollection>(&raw) {
            Ok(collection) => Some(collection),
            Err(e) => {
                warn!("Discarding malformed stored documents: {e}");
                None
            }
        }
    }

    fn save(&mut self, collection: &SlotCollection) -> Result<(), StoreError> {
        let content = serde_json::to_string(collection)?;
        debug!("Saving {} bytes of document slots", content.len());
        self.kv.set(DOCUMENTS_KEY, &content)
    }
}
