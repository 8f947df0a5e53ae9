use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    /// No backend to talk to (offline / mock environment)
    #[error("remote service unavailable: {0}")]
    Unavailable(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("not authorized, log in again")]
    Unauthorized,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The envelope came back with a non-success code
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RemoteError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        RemoteError::Unavailable(message.into())
    }
}
