//! Error types shared across the crate.
//!
//! `ApiError` covers everything that can go wrong talking to the backend and is
//! `Clone` so it can live in the store and be handed back to the caller at the
//! same time. `ConfigError` is only produced while resolving startup settings.

use thiserror::Error;

/// Failure of a single backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection, DNS or I/O failure before a response was read.
    #[error("network error: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// A success response whose body is not the expected JSON.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The background worker is gone and cannot take requests.
    #[error("request worker is not running")]
    WorkerUnavailable,
}

impl ApiError {
    /// HTTP status carried by the error, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result alias for backend calls.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Startup configuration failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API key configured: pass --api-key, set API_KEY, or store one in {0}")]
    MissingApiKey(String),

    #[error("API key contains characters that are not valid in an HTTP header")]
    InvalidApiKey,

    #[error("invalid base URL '{0}': expected http:// or https://")]
    InvalidBaseUrl(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
