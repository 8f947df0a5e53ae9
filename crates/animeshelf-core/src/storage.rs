use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

/// String-valued local storage, the shape of a browser's `localStorage`.
///
/// Values are opaque strings; callers decide the encoding (JSON here).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process key-value store.
///
/// Clones share the same map, so a test can keep a handle and inspect what
/// the store persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    data: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.lock().map(|data| data.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let data = self.data.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut data = self.data.lock().map_err(|_| StorageError::Poisoned)?;
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut data = self.data.lock().map_err(|_| StorageError::Poisoned)?;
        data.remove(key);
        Ok(())
    }
}
