pub mod traits;
pub mod error;
pub mod factory;
pub mod http;
pub mod offline;

pub use traits::RemoteAnimeService;
pub use error::RemoteError;
pub use factory::create_remote_service;
pub use http::HttpAnimeService;
pub use offline::OfflineAnimeService;
