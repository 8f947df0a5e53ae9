use serde::{Deserialize, Serialize};
use crate::anime_list::AnimeListEntry;
use crate::watch_history::HistoryEntry;

/// The full per-user state as the remote service reports it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AnimeListSnapshot {
    pub watching: Vec<AnimeListEntry>,
    pub completed: Vec<AnimeListEntry>,
    pub history: Vec<HistoryEntry>,
}

impl AnimeListSnapshot {
    pub fn is_empty(&self) -> bool {
        self.watching.is_empty() && self.completed.is_empty() && self.history.is_empty()
    }
}
