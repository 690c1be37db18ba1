//! Key-value storage seam
//!
//! The resolver never talks to a real browser. It reads and writes through
//! `KeyValueStore`, one instance per storage area (durable "local" storage
//! and per-tab "session" storage).

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// String key-value store with the semantics of the Web Storage API
///
/// Mutation goes through `&self`: a store is a shared handle, like the
/// browser's `localStorage`, and several readers may hold it at once.
pub trait KeyValueStore {
    /// Value stored under `key`, `None` when unset
    fn get_item(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str);

    /// Remove `key`; removing a missing key is a no-op
    fn remove_item(&self, key: &str);
}

/// In-memory store, single-threaded
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `(key, value)` pairs
    pub fn with_items<K, V, I>(items: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let items = items
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            items: RefCell::new(items),
        }
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

// ============================================================================
// Snapshots
// ============================================================================

/// Serializable contents of both storage areas
///
/// Used by the CLI to carry storage between runs. Files ending in `.json`
/// are written as JSON, anything else as YAML; both are accepted on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSnapshot {
    pub local: BTreeMap<String, String>,
    pub session: BTreeMap<String, String>,
}

impl StorageSnapshot {
    /// Read a snapshot; a missing file is an empty snapshot
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| {
            AppError::Config(format!(
                "Storage snapshot parse error in '{}': {}",
                path.display(),
                e
            ))
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let content = if is_json {
            serde_json::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self).map_err(|e| {
                AppError::Config(format!("Storage snapshot serialization error: {}", e))
            })?
        };
        fs::write(path, content)?;
        Ok(())
    }

    /// Split into `(local, session)` stores
    pub fn into_stores(self) -> (MemoryStore, MemoryStore) {
        (
            MemoryStore::with_items(self.local),
            MemoryStore::with_items(self.session),
        )
    }

    pub fn from_stores(local: &MemoryStore, session: &MemoryStore) -> Self {
        Self {
            local: local.snapshot(),
            session: session.snapshot(),
        }
    }
}
