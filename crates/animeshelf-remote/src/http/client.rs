use async_trait::async_trait;
use animeshelf_models::{AnimeListSnapshot, AnimeStatus, HistoryEntry};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use crate::error::RemoteError;
use crate::http::api;
use crate::traits::RemoteAnimeService;

/// REST client for the site's user anime-list endpoints
#[derive(Clone)]
pub struct HttpAnimeService {
    client: Arc<Client>,
    base_url: String,
    token: Option<String>,
}

impl HttpAnimeService {
    pub fn new(base_url: String, timeout_ms: u64, token: Option<String>) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .user_agent(concat!("animeshelf/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

#[async_trait]
impl RemoteAnimeService for HttpAnimeService {
    fn service_name(&self) -> &str {
        "http"
    }

    async fn add_anime(&self, video_id: u64, status: AnimeStatus) -> Result<(), RemoteError> {
        api::add_anime(&self.client, &self.base_url, self.token(), video_id, status).await
    }

    async fn remove_anime(&self, video_id: u64) -> Result<(), RemoteError> {
        api::remove_anime(&self.client, &self.base_url, self.token(), video_id).await
    }

    async fn get_anime_list(&self) -> Result<AnimeListSnapshot, RemoteError> {
        api::get_anime_list(&self.client, &self.base_url, self.token()).await
    }

    async fn update_history(&self, entry: &HistoryEntry) -> Result<(), RemoteError> {
        api::update_history(&self.client, &self.base_url, self.token(), entry).await
    }

    async fn clear_history(&self) -> Result<(), RemoteError> {
        api::clear_history(&self.client, &self.base_url, self.token()).await
    }

    async fn remove_history_item(&self, video_id: u64) -> Result<(), RemoteError> {
        api::remove_history_item(&self.client, &self.base_url, self.token(), video_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let service = HttpAnimeService::new("https://anime.example.com/api/".to_string(), 3000, None).unwrap();
        assert_eq!(service.base_url(), "https://anime.example.com/api");
        assert!(!service.is_authenticated());
    }
}
