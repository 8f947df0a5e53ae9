use std::sync::Arc;
use animeshelf_config::ApiConfig;
use tracing::info;
use crate::error::RemoteError;
use crate::http::HttpAnimeService;
use crate::offline::OfflineAnimeService;
use crate::traits::RemoteAnimeService;

/// Pick the remote service for a configuration.
///
/// Mock environments (no base URL, or a mock/localhost one) get the offline
/// service; everything else talks HTTP.
pub fn create_remote_service(
    api: &ApiConfig,
    token: Option<String>,
) -> Result<Arc<dyn RemoteAnimeService>, RemoteError> {
    match api.base_url() {
        Some(base_url) if !api.is_mock() => {
            info!("Using remote API at {}", base_url);
            let service = HttpAnimeService::new(base_url.to_string(), api.timeout_ms, token)?;
            Ok(Arc::new(service))
        }
        _ => {
            info!("No remote API configured, running offline");
            Ok(Arc::new(OfflineAnimeService::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_config_creates_offline_service() {
        let api = ApiConfig {
            base_url: Some("http://localhost:5173/api".to_string()),
            ..ApiConfig::default()
        };
        let service = create_remote_service(&api, None).unwrap();
        assert_eq!(service.service_name(), "offline");
    }

    #[test]
    fn test_real_config_creates_http_service() {
        let api = ApiConfig {
            base_url: Some("https://anime.example.com/api".to_string()),
            ..ApiConfig::default()
        };
        let service = create_remote_service(&api, Some("token".to_string())).unwrap();
        assert_eq!(service.service_name(), "http");
    }
}
