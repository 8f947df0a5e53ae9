use super::*;
use crate::cache::{HISTORY_KEY, WATCH_LIST_KEY};
use crate::storage::{MemoryKeyValueStore, StorageError};
use async_trait::async_trait;
use chrono::{Duration, TimeZone};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration as StdDuration;

/// Remote service that records every call and can be told to fail
#[derive(Default)]
struct RecordingRemote {
    calls: Mutex<Vec<String>>,
    fail_writes: bool,
    // None makes get_anime_list fail
    snapshot: Option<AnimeListSnapshot>,
    // get_anime_list answers 401 instead of being unreachable
    reject_token: bool,
    // add_anime waits this long before answering
    add_delay: Option<StdDuration>,
}

impl RecordingRemote {
    fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    fn with_snapshot(snapshot: AnimeListSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            ..Self::default()
        }
    }

    fn rejecting_token() -> Self {
        Self {
            reject_token: true,
            ..Self::default()
        }
    }

    fn slow(delay: StdDuration) -> Self {
        Self {
            add_delay: Some(delay),
            ..Self::default()
        }
    }

    fn record(&self, call: String) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_writes {
            Err(RemoteError::unavailable("server down"))
        } else {
            Ok(())
        }
    }

    fn calls(&self) -> Vec<String> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort();
        calls
    }
}

#[async_trait]
impl RemoteAnimeService for RecordingRemote {
    fn service_name(&self) -> &str {
        "recording"
    }

    async fn add_anime(&self, video_id: u64, status: AnimeStatus) -> Result<(), RemoteError> {
        if let Some(delay) = self.add_delay {
            tokio::time::sleep(delay).await;
        }
        self.record(format!("add {} {}", video_id, status))
    }

    async fn remove_anime(&self, video_id: u64) -> Result<(), RemoteError> {
        self.record(format!("remove {}", video_id))
    }

    async fn get_anime_list(&self) -> Result<AnimeListSnapshot, RemoteError> {
        self.calls.lock().unwrap().push("get".to_string());
        if self.reject_token {
            return Err(RemoteError::Unauthorized);
        }
        self.snapshot
            .clone()
            .ok_or_else(|| RemoteError::unavailable("server down"))
    }

    async fn update_history(&self, entry: &HistoryEntry) -> Result<(), RemoteError> {
        self.record(format!("history {} ep{}", entry.video_id, entry.episode_id))
    }

    async fn clear_history(&self) -> Result<(), RemoteError> {
        self.record("clear history".to_string())
    }

    async fn remove_history_item(&self, video_id: u64) -> Result<(), RemoteError> {
        self.record(format!("remove history {}", video_id))
    }
}

/// Key-value store whose writes always fail, like a full disk
struct FullStorage;

impl KeyValueStore for FullStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Io {
            path: PathBuf::from(format!("{}.json", key)),
            source: io::Error::new(io::ErrorKind::Other, "no space left on device"),
        })
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

fn video(id: u64) -> VideoSummary {
    VideoSummary::new(id, format!("Video {}", id))
}

fn new_store(remote: Arc<RecordingRemote>) -> (WatchListStore, MemoryKeyValueStore) {
    let kv = MemoryKeyValueStore::new();
    let store = WatchListStore::new(remote, Arc::new(kv.clone()));
    (store, kv)
}

fn entry_at(id: u64, status: AnimeStatus, minutes: i64) -> AnimeListEntry {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    AnimeListEntry::new(video(id), status, base + Duration::minutes(minutes))
}

fn history_at(id: u64, minutes: i64) -> HistoryEntry {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    HistoryEntry {
        video_id: id,
        episode_id: 1,
        episode_title: "Ep 1".to_string(),
        watched_at: base + Duration::minutes(minutes),
        progress: 0.0,
        video: None,
    }
}

fn ids<'a>(entries: impl Iterator<Item = &'a AnimeListEntry>) -> Vec<u64> {
    entries.map(|entry| entry.video_id).collect()
}

#[tokio::test]
async fn test_add_to_watching() {
    let remote = Arc::new(RecordingRemote::default());
    let (mut store, _kv) = new_store(remote.clone());

    store.add_to_watching(video(1));

    assert_eq!(store.get_status(1), Some(AnimeStatus::Watching));
    assert!(store.is_tracked(1));
    assert_eq!(ids(store.watching()), vec![1]);
    assert_eq!(store.completed_count(), 0);

    store.settle().await;
    assert_eq!(remote.calls(), vec!["add 1 watching"]);
}

#[tokio::test]
async fn test_watching_then_completed_is_exclusive() {
    let remote = Arc::new(RecordingRemote::default());
    let (mut store, _kv) = new_store(remote.clone());

    store.add_to_watching(video(42));
    assert_eq!(store.get_status(42), Some(AnimeStatus::Watching));

    store.add_to_completed(video(42));
    assert_eq!(store.get_status(42), Some(AnimeStatus::Completed));
    assert!(!ids(store.watching()).contains(&42));
    assert_eq!(ids(store.completed()), vec![42]);

    store.settle().await;
    assert_eq!(remote.calls(), vec!["add 42 completed", "add 42 watching"]);
}

#[tokio::test]
async fn test_completed_then_watching_is_exclusive() {
    let (mut store, _kv) = new_store(Arc::new(RecordingRemote::default()));

    store.add_to_completed(video(5));
    store.add_to_watching(video(5));

    assert_eq!(store.get_status(5), Some(AnimeStatus::Watching));
    assert_eq!(store.completed_count(), 0);
    assert_eq!(store.watching_count(), 1);
}

#[tokio::test]
async fn test_re_adding_keeps_first_added_at() {
    let (mut store, _kv) = new_store(Arc::new(RecordingRemote::default()));

    store.add_to_watching(video(1));
    store.add_to_watching(video(2));
    let first_added = store.watching().next().unwrap().added_at;

    store.add_to_watching(VideoSummary::new(1, "Renamed"));

    assert_eq!(ids(store.watching()), vec![1, 2]);
    let entry = store.watching().next().unwrap();
    assert_eq!(entry.added_at, first_added);
    assert_eq!(entry.title(), "Video 1");
}

#[tokio::test]
async fn test_remove_anime() {
    let remote = Arc::new(RecordingRemote::default());
    let (mut store, _kv) = new_store(remote.clone());

    store.add_to_completed(video(3));
    assert!(store.remove_anime(3));
    assert_eq!(store.get_status(3), None);
    assert!(!store.is_tracked(3));

    assert!(!store.remove_anime(99));

    store.settle().await;
    assert_eq!(remote.calls(), vec!["add 3 completed", "remove 3", "remove 99"]);
}

#[tokio::test]
async fn test_history_replaces_entry_for_same_video() {
    let (mut store, _kv) = new_store(Arc::new(RecordingRemote::default()));

    store.add_to_history(video(7), 3, "Ep 3", 120.0);
    let len_after_first = store.history_count();

    store.add_to_history(video(7), 4, "Ep 4", 5.0);

    assert_eq!(store.history_count(), len_after_first);
    let item = store.get_history_item(7).unwrap();
    assert_eq!(item.episode_id, 4);
    assert_eq!(item.episode_title, "Ep 4");
    assert_eq!(item.progress, 5.0);
    assert_eq!(store.history().iter().filter(|h| h.video_id == 7).count(), 1);
}

#[tokio::test]
async fn test_history_moves_rewatched_video_to_front() {
    let (mut store, _kv) = new_store(Arc::new(RecordingRemote::default()));

    store.add_to_history(video(1), 1, "Ep 1", 0.0);
    store.add_to_history(video(2), 1, "Ep 1", 0.0);
    store.add_to_history(video(1), 2, "Ep 2", 0.0);

    let order: Vec<u64> = store.history().iter().map(|h| h.video_id).collect();
    assert_eq!(order, vec![1, 2]);
}

#[tokio::test]
async fn test_history_is_capped_at_limit() {
    let (mut store, _kv) = new_store(Arc::new(RecordingRemote::default()));

    for id in 0..HISTORY_LIMIT as u64 {
        store.add_to_history(video(id), 1, "Ep 1", 0.0);
    }
    assert_eq!(store.history_count(), HISTORY_LIMIT);
    assert!(store.get_history_item(0).is_some());

    store.add_to_history(video(1000), 1, "Ep 1", 0.0);

    assert_eq!(store.history_count(), HISTORY_LIMIT);
    assert!(store.get_history_item(0).is_none());
    assert_eq!(store.history()[0].video_id, 1000);
    assert!(store.get_history_item(1).is_some());
}

#[tokio::test]
async fn test_history_is_ordered_most_recent_first() {
    let (mut store, _kv) = new_store(Arc::new(RecordingRemote::default()));

    for id in [5, 3, 9, 3, 1, 5, 7] {
        store.add_to_history(video(id), id, format!("Ep {}", id), 0.0);
    }

    let history = store.history();
    assert!(history.windows(2).all(|pair| pair[0].watched_at >= pair[1].watched_at));
    let order: Vec<u64> = history.iter().map(|h| h.video_id).collect();
    assert_eq!(order, vec![7, 5, 1, 3, 9]);
}

#[tokio::test]
async fn test_history_never_goes_back_in_time() {
    let remote = Arc::new(RecordingRemote::with_snapshot(AnimeListSnapshot {
        history: vec![HistoryEntry {
            watched_at: Utc::now() + Duration::hours(1),
            ..history_at(1, 0)
        }],
        ..AnimeListSnapshot::default()
    }));
    let (mut store, _kv) = new_store(remote);
    store.fetch_user_anime_list().await;

    store.add_to_history(video(2), 1, "Ep 1", 0.0);

    let history = store.history();
    assert_eq!(history[0].video_id, 2);
    assert!(history[0].watched_at >= history[1].watched_at);
}

#[tokio::test]
async fn test_clear_and_remove_history() {
    let remote = Arc::new(RecordingRemote::default());
    let (mut store, kv) = new_store(remote.clone());

    store.add_to_history(video(1), 1, "Ep 1", 0.0);
    store.add_to_history(video(2), 1, "Ep 1", 0.0);

    assert!(store.remove_history_item(1));
    assert!(!store.remove_history_item(1));
    assert!(store.get_history_item(1).is_none());
    assert_eq!(store.history_count(), 1);

    store.clear_history();
    assert_eq!(store.history_count(), 0);
    assert_eq!(kv.get(HISTORY_KEY).unwrap(), Some("[]".to_string()));

    store.settle().await;
    assert_eq!(
        remote.calls(),
        vec![
            "clear history",
            "history 1 ep1",
            "history 2 ep1",
            "remove history 1",
            "remove history 1",
        ]
    );
}

#[tokio::test]
async fn test_known_video_checks_list_then_history() {
    let remote = Arc::new(RecordingRemote::default());
    let (mut store, _kv) = new_store(remote);

    store.add_to_watching(VideoSummary::new(1, "Listed"));
    store.add_to_history(VideoSummary::new(1, "From history"), 1, "Ep 1", 0.0);
    store.add_to_history(VideoSummary::new(2, "Only watched"), 1, "Ep 1", 0.0);

    assert_eq!(store.known_video(1).map(|v| v.title.as_str()), Some("Listed"));
    assert_eq!(store.known_video(2).map(|v| v.title.as_str()), Some("Only watched"));
    assert!(store.known_video(3).is_none());
}

#[tokio::test]
async fn test_remote_failure_does_not_roll_back() {
    let remote = Arc::new(RecordingRemote::failing());
    let (mut store, _kv) = new_store(remote.clone());

    store.add_to_watching(video(1));
    store.add_to_completed(video(2));
    store.add_to_history(video(1), 1, "Ep 1", 30.0);
    store.settle().await;

    assert_eq!(store.get_status(1), Some(AnimeStatus::Watching));
    assert_eq!(store.get_status(2), Some(AnimeStatus::Completed));
    assert_eq!(store.get_history_item(1).unwrap().progress, 30.0);
    assert_eq!(remote.calls().len(), 3);
    assert_eq!(store.pending_syncs(), 0);
}

#[tokio::test]
async fn test_state_survives_a_new_store() {
    let kv = MemoryKeyValueStore::new();
    {
        let mut store = WatchListStore::new(Arc::new(RecordingRemote::default()), Arc::new(kv.clone()));
        store.add_to_watching(video(1));
        store.add_to_completed(video(2));
        store.add_to_history(video(1), 4, "Ep 4", 61.5);
        store.settle().await;
    }

    let store = WatchListStore::new(Arc::new(RecordingRemote::default()), Arc::new(kv));
    assert_eq!(store.get_status(1), Some(AnimeStatus::Watching));
    assert_eq!(store.get_status(2), Some(AnimeStatus::Completed));
    let item = store.get_history_item(1).unwrap();
    assert_eq!(item.episode_title, "Ep 4");
    assert_eq!(item.video.as_ref().unwrap().title, "Video 1");
}

#[tokio::test]
async fn test_malformed_cache_loads_empty() {
    let kv = MemoryKeyValueStore::new();
    kv.set(WATCH_LIST_KEY, "{\"watching\": [{\"videoId\": \"oops\"}]").unwrap();
    kv.set(HISTORY_KEY, "not json at all").unwrap();

    let store = WatchListStore::new(Arc::new(RecordingRemote::default()), Arc::new(kv));
    assert_eq!(store.watching_count(), 0);
    assert_eq!(store.completed_count(), 0);
    assert_eq!(store.history_count(), 0);
}

#[tokio::test]
async fn test_fetch_success_replaces_and_persists() {
    let snapshot = AnimeListSnapshot {
        watching: vec![entry_at(10, AnimeStatus::Watching, 0)],
        completed: vec![entry_at(11, AnimeStatus::Completed, 1)],
        history: vec![history_at(10, 5)],
    };
    let remote = Arc::new(RecordingRemote::with_snapshot(snapshot));
    let (mut store, kv) = new_store(remote);

    store.add_to_watching(video(1));
    store.add_to_history(video(1), 1, "Ep 1", 0.0);

    assert!(store.fetch_user_anime_list().await.is_remote());

    assert_eq!(store.get_status(1), None);
    assert!(store.get_history_item(1).is_none());
    assert_eq!(store.get_status(10), Some(AnimeStatus::Watching));
    assert_eq!(store.get_status(11), Some(AnimeStatus::Completed));
    assert_eq!(store.history_count(), 1);

    // A fresh store over the same storage sees the remote state
    let reloaded = WatchListStore::new(Arc::new(RecordingRemote::default()), Arc::new(kv));
    assert_eq!(ids(reloaded.watching()), vec![10]);
    assert_eq!(ids(reloaded.completed()), vec![11]);
    assert_eq!(reloaded.history()[0].video_id, 10);
}

#[tokio::test]
async fn test_fetch_normalizes_remote_snapshot() {
    let mut history: Vec<HistoryEntry> = (0..60).map(|id| history_at(id, id as i64)).collect();
    // Older duplicate of video 59 must lose to the newer one
    history.push(history_at(59, -10));

    let snapshot = AnimeListSnapshot {
        watching: vec![
            entry_at(1, AnimeStatus::Watching, 0),
            entry_at(2, AnimeStatus::Completed, 1), // mislabelled, list wins
            entry_at(1, AnimeStatus::Watching, 2),
        ],
        completed: vec![entry_at(1, AnimeStatus::Completed, 3)],
        history,
    };
    let (mut store, _kv) = new_store(Arc::new(RecordingRemote::with_snapshot(snapshot)));

    store.fetch_user_anime_list().await;

    assert_eq!(ids(store.watching()), vec![2]);
    assert_eq!(ids(store.completed()), vec![1]);
    assert_eq!(store.get_status(2), Some(AnimeStatus::Watching));

    let history = store.history();
    assert_eq!(history.len(), HISTORY_LIMIT);
    assert_eq!(history[0].video_id, 59);
    assert_eq!(history[0].watched_at, history_at(59, 59).watched_at);
    assert!(history.windows(2).all(|pair| pair[0].watched_at >= pair[1].watched_at));
}

#[tokio::test]
async fn test_fetch_failure_falls_back_to_cache() {
    let remote = Arc::new(RecordingRemote::failing());
    let (mut store, kv) = new_store(remote);

    store.add_to_watching(video(1));
    store.add_to_history(video(1), 2, "Ep 2", 10.0);

    // Someone else (another tab, an older run) rewrote the cache meanwhile
    let record = WatchListRecord {
        watching: vec![],
        completed: vec![entry_at(2, AnimeStatus::Completed, 0)],
        history: vec![],
    };
    kv.set(WATCH_LIST_KEY, &serde_json::to_string(&record).unwrap()).unwrap();

    let source = store.fetch_user_anime_list().await;
    assert!(matches!(
        source,
        SnapshotSource::Cache { reason: RemoteError::Unavailable(_) }
    ));
    assert!(!source.is_unauthorized());

    assert_eq!(store.get_status(1), None);
    assert_eq!(store.get_status(2), Some(AnimeStatus::Completed));
    assert_eq!(store.get_history_item(1).unwrap().episode_id, 2);
}

#[tokio::test]
async fn test_fetch_failure_with_no_cache_is_empty() {
    let (mut store, _kv) = new_store(Arc::new(RecordingRemote::failing()));

    assert!(!store.fetch_user_anime_list().await.is_remote());
    assert_eq!(store.watching_count(), 0);
    assert_eq!(store.completed_count(), 0);
    assert_eq!(store.history_count(), 0);
}

#[tokio::test]
async fn test_persistence_failure_keeps_memory_state() {
    let remote = Arc::new(RecordingRemote::default());
    let mut store = WatchListStore::new(remote.clone(), Arc::new(FullStorage));

    store.add_to_watching(video(1));
    store.add_to_history(video(1), 1, "Ep 1", 0.0);
    store.settle().await;

    assert_eq!(store.get_status(1), Some(AnimeStatus::Watching));
    assert_eq!(store.history_count(), 1);
    assert_eq!(remote.calls(), vec!["add 1 watching", "history 1 ep1"]);
}

#[tokio::test]
async fn test_rejected_token_is_reported_and_cache_kept() {
    let (mut store, _kv) = new_store(Arc::new(RecordingRemote::rejecting_token()));
    store.add_to_completed(video(3));

    let source = store.fetch_user_anime_list().await;

    assert!(source.is_unauthorized());
    assert!(matches!(source, SnapshotSource::Cache { reason: RemoteError::Unauthorized }));
    assert_eq!(store.get_status(3), Some(AnimeStatus::Completed));
}

#[tokio::test]
async fn test_invalid_progress_is_recorded_as_zero() {
    let remote = Arc::new(RecordingRemote::default());
    let (mut store, kv) = new_store(remote);

    for id in 0..10 {
        store.add_to_history(video(id), 1, "Ep 1", 10.0);
    }
    store.add_to_history(video(10), 1, "Ep 1", f64::NAN);
    store.add_to_history(video(11), 1, "Ep 1", f64::INFINITY);
    store.add_to_history(video(12), 1, "Ep 1", -4.0);

    assert_eq!(store.get_history_item(10).unwrap().progress, 0.0);
    assert_eq!(store.get_history_item(11).unwrap().progress, 0.0);
    assert_eq!(store.get_history_item(12).unwrap().progress, 0.0);

    // The persisted history stays readable
    let reloaded = WatchListStore::new(Arc::new(RecordingRemote::default()), Arc::new(kv));
    assert_eq!(reloaded.history_count(), 13);
    assert_eq!(reloaded.get_history_item(0).unwrap().progress, 10.0);
}

#[tokio::test]
async fn test_dropping_store_does_not_cancel_syncs() {
    let remote = Arc::new(RecordingRemote::slow(StdDuration::from_millis(50)));
    let (mut store, _kv) = new_store(remote.clone());

    store.add_to_watching(video(1));
    drop(store);

    tokio::time::sleep(StdDuration::from_millis(300)).await;
    assert_eq!(remote.calls(), vec!["add 1 watching"]);
}

#[tokio::test]
async fn test_finished_syncs_are_reaped_without_settle() {
    let remote = Arc::new(RecordingRemote::default());
    let (mut store, _kv) = new_store(remote.clone());

    for id in 0..100 {
        store.add_to_watching(video(id));
    }
    assert_eq!(store.pending_syncs(), 100);

    // Let every sync run to completion
    tokio::time::sleep(StdDuration::from_millis(50)).await;
    assert_eq!(remote.calls().len(), 100);

    store.remove_anime(0);
    assert_eq!(store.pending_syncs(), 1);
}

#[test]
fn test_mutations_outside_runtime_skip_remote_sync() {
    let remote = Arc::new(RecordingRemote::default());
    let (mut store, kv) = new_store(remote.clone());

    store.add_to_watching(video(1));
    store.clear_history();

    assert_eq!(store.get_status(1), Some(AnimeStatus::Watching));
    assert!(kv.get(WATCH_LIST_KEY).unwrap().is_some());
    assert_eq!(store.pending_syncs(), 0);
    assert!(remote.calls().is_empty());
}
