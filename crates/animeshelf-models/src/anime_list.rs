use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::status::AnimeStatus;
use crate::video::VideoSummary;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnimeListEntry {
    pub video_id: u64,
    pub status: AnimeStatus,
    pub added_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoSummary>, // Snapshot taken when the entry was added
}

impl AnimeListEntry {
    pub fn new(video: VideoSummary, status: AnimeStatus, added_at: DateTime<Utc>) -> Self {
        Self {
            video_id: video.id,
            status,
            added_at,
            video: Some(video),
        }
    }

    pub fn title(&self) -> String {
        self.video
            .as_ref()
            .map(|v| v.display_title())
            .unwrap_or_else(|| format!("#{}", self.video_id))
    }
}
