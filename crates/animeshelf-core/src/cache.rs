use animeshelf_models::{AnimeListEntry, HistoryEntry};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::storage::{KeyValueStore, StorageError};

/// Key holding the `{watching, completed}` pair
pub const WATCH_LIST_KEY: &str = "anime_user_list";
/// Key holding the history array
pub const HISTORY_KEY: &str = "anime_watch_history";

/// Persisted shape of the watch-list
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WatchListRecord {
    pub watching: Vec<AnimeListEntry>,
    pub completed: Vec<AnimeListEntry>,
    /// Older clients kept history under the watch-list key; read but never written
    #[serde(skip_serializing)]
    pub history: Vec<HistoryEntry>,
}

/// JSON snapshots of the watch-list and history in a key-value store.
///
/// Reads never fail: missing, unreadable or corrupt values come back as
/// `None` so the caller can start from empty collections.
#[derive(Clone)]
pub struct SnapshotCache {
    kv: Arc<dyn KeyValueStore>,
}

impl SnapshotCache {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub fn load_watch_list(&self) -> Option<WatchListRecord> {
        self.load_value(WATCH_LIST_KEY)
    }

    pub fn save_watch_list(&self, record: &WatchListRecord) -> Result<(), StorageError> {
        self.save_value(WATCH_LIST_KEY, record)
    }

    /// History from its own key, falling back to the legacy combined record
    pub fn load_history(&self) -> Option<Vec<HistoryEntry>> {
        self.load_value(HISTORY_KEY).or_else(|| {
            self.load_watch_list()
                .map(|record| record.history)
                .filter(|history| !history.is_empty())
        })
    }

    pub fn save_history(&self, history: &[HistoryEntry]) -> Result<(), StorageError> {
        self.save_value(HISTORY_KEY, history)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.kv.remove(WATCH_LIST_KEY)?;
        self.kv.remove(HISTORY_KEY)?;
        info!("Cleared cached anime list and history");
        Ok(())
    }

    fn load_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let content = match self.kv.get(key) {
            Ok(Some(content)) => content,
            Ok(None) => {
                debug!("Cache miss: {} (no stored value)", key);
                return None;
            }
            Err(e) => {
                warn!("Failed to read cached {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str::<T>(&content) {
            Ok(value) => {
                debug!("Cache hit: {}", key);
                Some(value)
            }
            Err(e) => {
                warn!("Cache corruption detected for {}: {}. Ignoring stored value.", key, e);
                None
            }
        }
    }

    fn save_value<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        self.kv.set(key, &json)?;
        debug!("Cache saved: {} ({} bytes)", key, json.len());
        Ok(())
    }
}
