use serde::{Deserialize, Serialize};

/// Snapshot of a video as the site API describes it.
///
/// Only `id` is required; the rest is display metadata that travels with
/// watch-list and history entries so they can be rendered without another
/// round-trip. Unknown fields from the server are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoSummary {
    pub id: u64,
    pub title: String,
    pub cover: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<String>, // e.g. "更新至12集" / "全24集"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_episode: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>, // seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_info: Option<String>,
}

impl VideoSummary {
    /// Minimal snapshot carrying only an id and a title
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            ..Self::default()
        }
    }

    /// Title for display, falling back to the id when the snapshot has none
    pub fn display_title(&self) -> String {
        if self.title.trim().is_empty() {
            format!("#{}", self.id)
        } else {
            self.title.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_server_video_with_extra_fields() {
        let json = r#"{
            "id": 42,
            "title": "Frieren",
            "cover": "https://img.example/42.jpg",
            "playCount": 1200,
            "likeCount": 30,
            "collectCount": 7,
            "tags": ["fantasy"],
            "year": 2023,
            "createdAt": "2023-09-29T00:00:00Z"
        }"#;
        let video: VideoSummary = serde_json::from_str(json).unwrap();
        assert_eq!(video.id, 42);
        assert_eq!(video.play_count, Some(1200));
        assert_eq!(video.tags, vec!["fantasy".to_string()]);
        assert_eq!(video.year, Some(2023));
    }

    #[test]
    fn test_display_title_falls_back_to_id() {
        assert_eq!(VideoSummary::new(7, "").display_title(), "#7");
        assert_eq!(VideoSummary::new(7, "Mushishi").display_title(), "Mushishi");
    }
}
