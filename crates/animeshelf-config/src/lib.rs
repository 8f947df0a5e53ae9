pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{ApiConfig, Config, LoggingConfig, default_timeout_ms};
pub use credentials::CredentialStore;
pub use paths::{PathManager, container_base_path};
