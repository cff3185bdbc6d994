//! Instance plugin error types

use thiserror::Error;

/// Errors reported by the remote provider capability.
///
/// The core never interprets these beyond carrying them to the caller.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("response decode error: {0}")]
    Decode(String),

    #[error("timed out: {0}")]
    Timeout(String),
}

/// State store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("state entry not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Instance lifecycle errors
#[derive(Error, Debug)]
pub enum InstanceError {
    #[error("API access key not found. Set --api-key or ONEANDONE_API_KEY")]
    Unconfigured,

    #[error("invalid instance properties: {0}")]
    InvalidProperties(#[from] serde_json::Error),

    #[error("validating {catalog} '{selector}' failed: {source}")]
    CatalogUnavailable {
        catalog: &'static str,
        selector: String,
        #[source]
        source: ProviderError,
    },

    #[error("{catalog} '{selector}' could not be found")]
    NotFound {
        catalog: &'static str,
        selector: String,
    },

    #[error("creating server '{name}' failed: {source}")]
    CreateFailed {
        name: String,
        #[source]
        source: ProviderError,
    },

    #[error("{operation} for '{target}' failed: {source}")]
    Remote {
        operation: &'static str,
        target: String,
        #[source]
        source: ProviderError,
    },

    #[error("deleting server '{id}' failed: {source}")]
    DeleteFailed {
        id: String,
        #[source]
        source: ProviderError,
    },

    #[error("server '{id}' was created but its descriptor could not be written: {source}")]
    PersistFailed {
        id: String,
        #[source]
        source: StoreError,
    },

    #[error("instance descriptor '{name}' is corrupt: {source}")]
    CorruptState {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("state store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, InstanceError>;
