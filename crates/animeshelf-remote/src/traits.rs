use async_trait::async_trait;
use animeshelf_models::{AnimeListSnapshot, AnimeStatus, HistoryEntry};
use crate::error::RemoteError;

/// The site's per-user anime-list API.
///
/// Implementations are shared between the store and its detached sync tasks,
/// so they must be `Send + Sync` and are held behind an `Arc`.
#[async_trait]
pub trait RemoteAnimeService: Send + Sync {
    // Service metadata (for logging)
    fn service_name(&self) -> &str;

    // Watch-list
    async fn add_anime(&self, video_id: u64, status: AnimeStatus) -> Result<(), RemoteError>;
    async fn remove_anime(&self, video_id: u64) -> Result<(), RemoteError>;
    async fn get_anime_list(&self) -> Result<AnimeListSnapshot, RemoteError>;

    // Watch history
    async fn update_history(&self, entry: &HistoryEntry) -> Result<(), RemoteError>;
    async fn clear_history(&self) -> Result<(), RemoteError>;
    async fn remove_history_item(&self, video_id: u64) -> Result<(), RemoteError>;
}
