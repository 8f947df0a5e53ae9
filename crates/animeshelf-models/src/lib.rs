pub mod anime_list;
pub mod snapshot;
pub mod status;
pub mod user;
pub mod video;
pub mod watch_history;

pub use anime_list::AnimeListEntry;
pub use snapshot::AnimeListSnapshot;
pub use status::AnimeStatus;
pub use user::UserProfile;
pub use video::VideoSummary;
pub use watch_history::HistoryEntry;
