use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::video::VideoSummary;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub video_id: u64,
    pub episode_id: u64,
    pub episode_title: String,
    pub watched_at: DateTime<Utc>,
    #[serde(default)]
    pub progress: f64, // Playback position in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoSummary>,
}

impl HistoryEntry {
    pub fn title(&self) -> String {
        self.video
            .as_ref()
            .map(|v| v.display_title())
            .unwrap_or_else(|| format!("#{}", self.video_id))
    }
}
