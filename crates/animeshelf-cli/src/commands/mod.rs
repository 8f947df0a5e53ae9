pub mod anime;
pub mod clear;
pub mod config;
pub mod history;
pub mod list;
pub mod session;
pub mod sync;

use animeshelf_config::{Config, CredentialStore, PathManager};
use animeshelf_core::{FileKeyValueStore, WatchListStore};
use animeshelf_models::VideoSummary;
use animeshelf_remote::create_remote_service;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::sync::Arc;

/// Everything a command needs: where files live, the config, the session
pub struct AppContext {
    pub paths: PathManager,
    pub config: Config,
    pub credentials: CredentialStore,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let paths = PathManager::default();
        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

        let credentials_file = paths.credentials_file();
        let mut credentials = CredentialStore::new(credentials_file.clone());
        credentials.load()
            .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

        Ok(Self { paths, config, credentials })
    }

    /// Open the watch-list store backed by the on-disk key-value store
    pub fn open_store(&self) -> Result<WatchListStore> {
        self.config.validate()
            .map_err(|e| eyre!("Configuration validation failed: {}", e))?;

        let token = self.credentials.get_token().cloned();
        let remote = create_remote_service(&self.config.api, token)
            .map_err(|e| eyre!("Failed to create remote service: {}", e))?;

        let kv = FileKeyValueStore::from_paths(&self.paths)
            .map_err(|e| eyre!("Failed to open local storage: {}", e))?;

        Ok(WatchListStore::new(remote, Arc::new(kv)))
    }
}

/// The summary to record for a video: an explicit title wins, then whatever
/// the store already knows, then a bare placeholder
pub fn resolve_video(store: &WatchListStore, video_id: u64, title: Option<String>) -> VideoSummary {
    let mut video = store
        .known_video(video_id)
        .cloned()
        .unwrap_or_else(|| VideoSummary::new(video_id, String::new()));

    if let Some(title) = title {
        video.title = title;
    }
    video
}
