//! Error types for idlerealm-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid upgrade mode: {0} (expected 1, 10, 100 or MAX)")]
    InvalidUpgradeMode(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
