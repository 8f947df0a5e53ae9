pub mod cache;
pub mod file_storage;
pub mod storage;
pub mod store;

pub use cache::{SnapshotCache, WatchListRecord, HISTORY_KEY, WATCH_LIST_KEY};
pub use file_storage::FileKeyValueStore;
pub use storage::{KeyValueStore, MemoryKeyValueStore, StorageError};
pub use store::{SnapshotSource, WatchListStore, HISTORY_LIMIT};
