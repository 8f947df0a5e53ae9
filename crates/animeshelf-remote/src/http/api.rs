use animeshelf_models::{AnimeListSnapshot, AnimeStatus, HistoryEntry};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::error::RemoteError;

/// Every API response is wrapped as `{code, message, data}`
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddAnimeRequest {
    video_id: u64,
    status: AnimeStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateHistoryRequest<'a> {
    video_id: u64,
    episode_id: u64,
    episode_title: &'a str,
    progress: f64,
}

fn is_success_code(code: i64) -> bool {
    code == 0 || code == 200
}

/// Unwrap an envelope body, turning a non-success code into `RemoteError::Api`
pub(crate) fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<Option<T>, RemoteError> {
    let envelope: ApiEnvelope<T> = serde_json::from_str(body)?;
    if !is_success_code(envelope.code) {
        let message = if envelope.message.is_empty() {
            "request failed".to_string()
        } else {
            envelope.message
        };
        return Err(RemoteError::Api { code: envelope.code, message });
    }
    Ok(envelope.data)
}

/// Map HTTP-level failures before looking at the body
pub(crate) fn check_status(status: u16, body: &str) -> Result<(), RemoteError> {
    match status {
        200..=299 => Ok(()),
        401 => Err(RemoteError::Unauthorized),
        _ => Err(RemoteError::Status {
            status,
            body: body.to_string(),
        }),
    }
}

fn authorized(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}

async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<Option<T>, RemoteError> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    check_status(status, &body)?;
    decode_envelope(&body)
}

/// GET /user/anime-list
pub async fn get_anime_list(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
) -> Result<AnimeListSnapshot, RemoteError> {
    let url = format!("{}/user/anime-list", base_url);
    debug!("GET {}", url);

    let response = authorized(client.get(&url), token).send().await?;
    let snapshot: Option<AnimeListSnapshot> = read_envelope(response).await?;
    Ok(snapshot.unwrap_or_default())
}

/// POST /user/anime
pub async fn add_anime(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    video_id: u64,
    status: AnimeStatus,
) -> Result<(), RemoteError> {
    let url = format!("{}/user/anime", base_url);
    debug!("POST {} (video {} -> {})", url, video_id, status);

    let body = AddAnimeRequest { video_id, status };
    let response = authorized(client.post(&url), token).json(&body).send().await?;
    read_envelope::<serde_json::Value>(response).await?;
    Ok(())
}

/// DELETE /user/anime/{videoId}
pub async fn remove_anime(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    video_id: u64,
) -> Result<(), RemoteError> {
    let url = format!("{}/user/anime/{}", base_url, video_id);
    debug!("DELETE {}", url);

    let response = authorized(client.delete(&url), token).send().await?;
    read_envelope::<serde_json::Value>(response).await?;
    Ok(())
}

/// POST /user/history
pub async fn update_history(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    entry: &HistoryEntry,
) -> Result<(), RemoteError> {
    let url = format!("{}/user/history", base_url);
    debug!("POST {} (video {}, episode {})", url, entry.video_id, entry.episode_id);

    let body = UpdateHistoryRequest {
        video_id: entry.video_id,
        episode_id: entry.episode_id,
        episode_title: &entry.episode_title,
        progress: entry.progress,
    };
    let response = authorized(client.post(&url), token).json(&body).send().await?;
    read_envelope::<serde_json::Value>(response).await?;
    Ok(())
}

/// DELETE /user/history/{videoId}
pub async fn remove_history_item(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    video_id: u64,
) -> Result<(), RemoteError> {
    let url = format!("{}/user/history/{}", base_url, video_id);
    debug!("DELETE {}", url);

    let response = authorized(client.delete(&url), token).send().await?;
    read_envelope::<serde_json::Value>(response).await?;
    Ok(())
}

/// DELETE /user/history
pub async fn clear_history(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
) -> Result<(), RemoteError> {
    let url = format!("{}/user/history", base_url);
    debug!("DELETE {}", url);

    let response = authorized(client.delete(&url), token).send().await?;
    read_envelope::<serde_json::Value>(response).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_envelope_success_codes() {
        let ok_zero: Option<serde_json::Value> =
            decode_envelope(r#"{"code":0,"message":"ok","data":{"success":true}}"#).unwrap();
        assert_eq!(ok_zero.unwrap()["success"], true);

        let ok_200: Option<serde_json::Value> =
            decode_envelope(r#"{"code":200,"message":"ok","data":null}"#).unwrap();
        assert!(ok_200.is_none());
    }

    #[test]
    fn test_decode_envelope_error_code() {
        let err = decode_envelope::<serde_json::Value>(r#"{"code":4001,"message":"video not found"}"#)
            .unwrap_err();
        match err {
            RemoteError::Api { code, message } => {
                assert_eq!(code, 4001);
                assert_eq!(message, "video not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_decode_envelope_error_without_message() {
        let err = decode_envelope::<serde_json::Value>(r#"{"code":500}"#).unwrap_err();
        assert!(matches!(err, RemoteError::Api { code: 500, ref message } if message == "request failed"));
    }

    #[test]
    fn test_decode_envelope_malformed_body() {
        let err = decode_envelope::<serde_json::Value>("<html>502</html>").unwrap_err();
        assert!(matches!(err, RemoteError::Decode(_)));
    }

    #[test]
    fn test_decode_anime_list() {
        let body = r#"{
            "code": 0,
            "message": "ok",
            "data": {
                "watching": [
                    {"videoId": 1, "status": "watching", "addedAt": "2024-03-01T10:00:00Z",
                     "video": {"id": 1, "title": "Frieren", "cover": ""}}
                ],
                "completed": [],
                "history": [
                    {"videoId": 1, "episodeId": 12, "episodeTitle": "Ep 12",
                     "watchedAt": "2024-03-02T10:00:00Z", "progress": 300}
                ]
            }
        }"#;
        let snapshot: AnimeListSnapshot = decode_envelope(body).unwrap().unwrap();
        assert_eq!(snapshot.watching.len(), 1);
        assert_eq!(snapshot.watching[0].status, AnimeStatus::Watching);
        assert_eq!(snapshot.history[0].episode_id, 12);
        assert_eq!(snapshot.history[0].progress, 300.0);
    }

    #[test]
    fn test_check_status() {
        assert!(check_status(200, "").is_ok());
        assert!(check_status(204, "").is_ok());
        assert!(matches!(check_status(401, ""), Err(RemoteError::Unauthorized)));
        assert!(matches!(
            check_status(503, "maintenance"),
            Err(RemoteError::Status { status: 503, .. })
        ));
    }

    #[test]
    fn test_request_bodies_use_camel_case() {
        let body = serde_json::to_value(AddAnimeRequest {
            video_id: 42,
            status: AnimeStatus::Completed,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"videoId": 42, "status": "completed"}));
    }
}
