use async_trait::async_trait;
use animeshelf_models::{AnimeListSnapshot, AnimeStatus, HistoryEntry};
use tracing::debug;
use crate::error::RemoteError;
use crate::traits::RemoteAnimeService;

/// Stand-in used when no real backend is configured.
///
/// Writes are accepted and dropped, matching how the web client behaves in a
/// mock environment. Reads fail with `Unavailable` so a fetch falls back to the
/// local cache rather than replacing it with nothing.
#[derive(Debug, Clone, Default)]
pub struct OfflineAnimeService;

impl OfflineAnimeService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RemoteAnimeService for OfflineAnimeService {
    fn service_name(&self) -> &str {
        "offline"
    }

    async fn add_anime(&self, video_id: u64, status: AnimeStatus) -> Result<(), RemoteError> {
        debug!("offline: add anime {} as {}", video_id, status);
        Ok(())
    }

    async fn remove_anime(&self, video_id: u64) -> Result<(), RemoteError> {
        debug!("offline: remove anime {}", video_id);
        Ok(())
    }

    async fn get_anime_list(&self) -> Result<AnimeListSnapshot, RemoteError> {
        Err(RemoteError::unavailable("no API base URL configured"))
    }

    async fn update_history(&self, entry: &HistoryEntry) -> Result<(), RemoteError> {
        debug!("offline: update history for {}", entry.video_id);
        Ok(())
    }

    async fn clear_history(&self) -> Result<(), RemoteError> {
        debug!("offline: clear history");
        Ok(())
    }

    async fn remove_history_item(&self, video_id: u64) -> Result<(), RemoteError> {
        debug!("offline: remove history item {}", video_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_writes_succeed_and_reads_fail() {
        let service = OfflineAnimeService::new();
        assert!(service.add_anime(1, AnimeStatus::Watching).await.is_ok());
        assert!(service.remove_anime(1).await.is_ok());
        assert!(service.clear_history().await.is_ok());
        assert!(matches!(
            service.get_anime_list().await,
            Err(RemoteError::Unavailable(_))
        ));
    }
}
