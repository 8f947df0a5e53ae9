use serde::{Deserialize, Serialize};

/// The signed-in account as returned by the login endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub avatar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub anime_count: u64,
    pub history_count: u64,
}
