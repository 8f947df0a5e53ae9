use animeshelf_models::{AnimeListEntry, AnimeListSnapshot, AnimeStatus, HistoryEntry, VideoSummary};
use animeshelf_remote::{RemoteAnimeService, RemoteError};
use chrono::Utc;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use crate::cache::{SnapshotCache, WatchListRecord};
use crate::storage::KeyValueStore;

/// Maximum number of entries kept in the watch history
pub const HISTORY_LIMIT: usize = 50;

/// Where `fetch_user_anime_list` got its data from
#[derive(Debug)]
pub enum SnapshotSource {
    /// The remote service answered; its state replaced ours
    Remote,
    /// The remote call failed with `reason`; the last cached snapshot was
    /// loaded instead
    Cache { reason: RemoteError },
}

impl SnapshotSource {
    pub fn is_remote(&self) -> bool {
        matches!(self, SnapshotSource::Remote)
    }

    /// The server rejected the session token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SnapshotSource::Cache { reason: RemoteError::Unauthorized })
    }
}

/// The current user's watch-list and watch history.
///
/// Reads come from memory. Every mutation updates memory and the local
/// key-value store before returning, then hands the matching remote call to a
/// detached task whose outcome is only logged. A failed remote call never
/// rolls the local change back.
///
/// Mutations spawn onto the ambient tokio runtime; outside a runtime the
/// remote sync is skipped with a warning. Dropping the store detaches syncs
/// still in flight, it never cancels them.
pub struct WatchListStore {
    remote: Arc<dyn RemoteAnimeService>,
    cache: SnapshotCache,
    // Keyed by video id; the status tag splits it into watching / completed
    entries: IndexMap<u64, AnimeListEntry>,
    // Most recent first, at most HISTORY_LIMIT entries, one per video id
    history: Vec<HistoryEntry>,
    pending: JoinSet<()>,
}

impl WatchListStore {
    /// Build the store and load whatever snapshot the local store holds
    pub fn new(remote: Arc<dyn RemoteAnimeService>, kv: Arc<dyn KeyValueStore>) -> Self {
        let mut store = Self {
            remote,
            cache: SnapshotCache::new(kv),
            entries: IndexMap::new(),
            history: Vec::new(),
            pending: JoinSet::new(),
        };
        store.load_from_cache();
        store
    }

    // ---- reads ----

    pub fn get_status(&self, video_id: u64) -> Option<AnimeStatus> {
        self.entries.get(&video_id).map(|entry| entry.status)
    }

    pub fn is_tracked(&self, video_id: u64) -> bool {
        self.get_status(video_id).is_some()
    }

    pub fn watching(&self) -> impl Iterator<Item = &AnimeListEntry> + '_ {
        self.with_status(AnimeStatus::Watching)
    }

    pub fn completed(&self) -> impl Iterator<Item = &AnimeListEntry> + '_ {
        self.with_status(AnimeStatus::Completed)
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn watching_count(&self) -> usize {
        self.watching().count()
    }

    pub fn completed_count(&self) -> usize {
        self.completed().count()
    }

    pub fn history_count(&self) -> usize {
        self.history.len()
    }

    pub fn get_history_item(&self, video_id: u64) -> Option<&HistoryEntry> {
        self.history.iter().find(|entry| entry.video_id == video_id)
    }

    /// Latest known summary for a video, from the watch-list or the history
    pub fn known_video(&self, video_id: u64) -> Option<&VideoSummary> {
        self.entries
            .get(&video_id)
            .and_then(|entry| entry.video.as_ref())
            .or_else(|| self.get_history_item(video_id).and_then(|entry| entry.video.as_ref()))
    }

    /// Remote syncs spawned and not yet reaped; finished ones are dropped on the next mutation or by `settle`
    pub fn pending_syncs(&self) -> usize {
        self.pending.len()
    }

    fn with_status(&self, status: AnimeStatus) -> impl Iterator<Item = &AnimeListEntry> + '_ {
        self.entries.values().filter(move |entry| entry.status == status)
    }

    // ---- watch-list mutations ----

    pub fn add_to_watching(&mut self, video: VideoSummary) {
        self.add_with_status(video, AnimeStatus::Watching);
    }

    pub fn add_to_completed(&mut self, video: VideoSummary) {
        self.add_with_status(video, AnimeStatus::Completed);
    }

    fn add_with_status(&mut self, video: VideoSummary, status: AnimeStatus) {
        let video_id = video.id;

        match self.entries.get(&video_id).map(|entry| entry.status) {
            Some(current) if current == status => {
                // First write wins: keep the original added_at and position
                debug!("Video {} is already {}", video_id, status);
            }
            Some(current) => {
                debug!("Moving video {} from {} to {}", video_id, current, status);
                self.entries.shift_remove(&video_id);
                self.entries.insert(video_id, AnimeListEntry::new(video, status, Utc::now()));
            }
            None => {
                self.entries.insert(video_id, AnimeListEntry::new(video, status, Utc::now()));
            }
        }

        self.persist_watch_list();
        self.spawn_sync(format!("add video {} as {}", video_id, status), move |remote| async move {
            remote.add_anime(video_id, status).await
        });
    }

    /// Drop a video from the watch-list; returns whether it was tracked
    pub fn remove_anime(&mut self, video_id: u64) -> bool {
        let removed = self.entries.shift_remove(&video_id).is_some();
        if !removed {
            debug!("Video {} was not in the watch-list", video_id);
        }

        self.persist_watch_list();
        self.spawn_sync(format!("remove video {}", video_id), move |remote| async move {
            remote.remove_anime(video_id).await
        });
        removed
    }

    // ---- history mutations ----

    /// Record a playback session, replacing any earlier one for the same video
    pub fn add_to_history(
        &mut self,
        video: VideoSummary,
        episode_id: u64,
        episode_title: impl Into<String>,
        progress: f64,
    ) {
        let video_id = video.id;
        self.history.retain(|entry| entry.video_id != video_id);

        // NaN and infinities serialize as null, which would make the whole
        // persisted history unreadable
        let progress = if progress.is_finite() && progress >= 0.0 {
            progress
        } else {
            warn!("Invalid progress {} for video {}, recording 0", progress, video_id);
            0.0
        };

        // Never older than the current front, even if the clock stepped back
        let now = Utc::now();
        let watched_at = match self.history.first() {
            Some(front) if front.watched_at > now => front.watched_at,
            _ => now,
        };

        let entry = HistoryEntry {
            video_id,
            episode_id,
            episode_title: episode_title.into(),
            watched_at,
            progress,
            video: Some(video),
        };
        self.history.insert(0, entry.clone());
        self.history.truncate(HISTORY_LIMIT);

        self.persist_history();
        self.spawn_sync(format!("update history for video {}", video_id), move |remote| async move {
            remote.update_history(&entry).await
        });
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.persist_history();
        self.spawn_sync("clear history".to_string(), |remote| async move {
            remote.clear_history().await
        });
    }

    /// Drop one video's history entry; returns whether it existed
    pub fn remove_history_item(&mut self, video_id: u64) -> bool {
        let before = self.history.len();
        self.history.retain(|entry| entry.video_id != video_id);
        let removed = self.history.len() != before;

        self.persist_history();
        self.spawn_sync(format!("remove history for video {}", video_id), move |remote| async move {
            remote.remove_history_item(video_id).await
        });
        removed
    }

    // ---- bulk sync ----

    /// Replace local state with the remote service's, or fall back to the cache.
    ///
    /// On success all three collections are replaced wholesale and persisted.
    /// On failure the last persisted snapshot is reloaded, which is empty if
    /// nothing was ever cached.
    pub async fn fetch_user_anime_list(&mut self) -> SnapshotSource {
        match self.remote.get_anime_list().await {
            Ok(snapshot) => {
                self.apply_snapshot(snapshot);
                self.persist_watch_list();
                self.persist_history();
                info!(
                    "Fetched anime list from {}: {} watching, {} completed, {} history",
                    self.remote.service_name(),
                    self.watching_count(),
                    self.completed_count(),
                    self.history_count()
                );
                SnapshotSource::Remote
            }
            Err(reason) => {
                warn!(
                    "Failed to fetch anime list from {}: {}. Using cached data.",
                    self.remote.service_name(),
                    reason
                );
                self.load_from_cache();
                SnapshotSource::Cache { reason }
            }
        }
    }

    /// Wait for every in-flight remote sync to finish.
    ///
    /// Sync failures were already logged by the tasks themselves; this only
    /// reports tasks that panicked.
    pub async fn settle(&mut self) {
        while let Some(result) = self.pending.join_next().await {
            if let Err(e) = result {
                warn!("Remote sync task did not complete: {}", e);
            }
        }
    }

    // ---- internals ----

    fn spawn_sync<F, Fut>(&mut self, action: String, op: F)
    where
        F: FnOnce(Arc<dyn RemoteAnimeService>) -> Fut,
        Fut: Future<Output = Result<(), RemoteError>> + Send + 'static,
    {
        if tokio::runtime::Handle::try_current().is_err() {
            warn!("No async runtime available, skipping remote sync ({})", action);
            return;
        }

        // Reap finished syncs so a long-lived store does not accumulate them
        while let Some(result) = self.pending.try_join_next() {
            if let Err(e) = result {
                warn!("Remote sync task did not complete: {}", e);
            }
        }

        let service = self.remote.service_name().to_string();
        let sync = op(Arc::clone(&self.remote));
        self.pending.spawn(async move {
            match sync.await {
                Ok(()) => debug!("Remote sync via {} succeeded ({})", service, action),
                Err(e) => warn!("Remote sync via {} failed ({}): {}", service, action, e),
            }
        });
    }

    fn apply_snapshot(&mut self, snapshot: AnimeListSnapshot) {
        self.entries = build_entries(snapshot.watching, snapshot.completed);
        self.history = normalize_history(snapshot.history);
    }

    fn load_from_cache(&mut self) {
        let record = self.cache.load_watch_list().unwrap_or_default();
        let history = self.cache.load_history().unwrap_or_default();
        self.entries = build_entries(record.watching, record.completed);
        self.history = normalize_history(history);
        info!(
            "Loaded cached anime list: {} watching, {} completed, {} history",
            self.watching_count(),
            self.completed_count(),
            self.history_count()
        );
    }

    fn persist_watch_list(&self) {
        let record = WatchListRecord {
            watching: self.watching().cloned().collect(),
            completed: self.completed().cloned().collect(),
            history: Vec::new(),
        };
        if let Err(e) = self.cache.save_watch_list(&record) {
            warn!("Failed to persist watch-list, keeping in-memory state: {}", e);
        }
    }

    fn persist_history(&self) {
        if let Err(e) = self.cache.save_history(&self.history) {
            warn!("Failed to persist watch history, keeping in-memory state: {}", e);
        }
    }
}

impl Drop for WatchListStore {
    fn drop(&mut self) {
        // Dropping a JoinSet aborts its tasks; issued syncs must still land
        self.pending.detach_all();
    }
}

/// Merge the two lists into one map, one entry per video.
///
/// Each entry takes the status of the list it came from. A video listed as
/// both watching and completed ends up completed; duplicates within one list
/// keep the first occurrence.
fn build_entries(
    watching: Vec<AnimeListEntry>,
    completed: Vec<AnimeListEntry>,
) -> IndexMap<u64, AnimeListEntry> {
    let mut entries: IndexMap<u64, AnimeListEntry> = IndexMap::new();

    for mut entry in watching {
        entry.status = AnimeStatus::Watching;
        entries.entry(entry.video_id).or_insert(entry);
    }

    for mut entry in completed {
        entry.status = AnimeStatus::Completed;
        match entries.get(&entry.video_id).map(|existing| existing.status) {
            Some(AnimeStatus::Completed) => {}
            Some(AnimeStatus::Watching) => {
                warn!("Video {} is both watching and completed, keeping completed", entry.video_id);
                entries.shift_remove(&entry.video_id);
                entries.insert(entry.video_id, entry);
            }
            None => {
                entries.insert(entry.video_id, entry);
            }
        }
    }

    entries
}

/// Most recent first, one entry per video, capped at `HISTORY_LIMIT`
fn normalize_history(mut history: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    history.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));

    let mut seen = HashSet::new();
    history.retain(|entry| seen.insert(entry.video_id));
    history.truncate(HISTORY_LIMIT);
    history
}

#[cfg(test)]
mod tests;
