//! Error types for idlerealm-client

use idlerealm_admin::ApiError;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a local file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    Config(String),

    /// The HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// The backend rejected a request
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, Error>;
