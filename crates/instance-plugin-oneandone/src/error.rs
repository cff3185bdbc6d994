//! 1&1 client error types

use instance_plugin::ProviderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OneAndOneError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("1&1 API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OneAndOneError>;

impl From<OneAndOneError> for ProviderError {
    fn from(err: OneAndOneError) -> Self {
        match err {
            OneAndOneError::Http(e) if e.is_timeout() => ProviderError::Timeout(e.to_string()),
            OneAndOneError::Http(e) => ProviderError::Transport(e.to_string()),
            OneAndOneError::Api { status, message } => ProviderError::Status { status, message },
            OneAndOneError::Json(e) => ProviderError::Decode(e.to_string()),
        }
    }
}
