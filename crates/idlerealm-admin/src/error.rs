//! Error types for idlerealm-admin

use crate::api::ApiError;
use thiserror::Error;

/// Admin engine error type
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Empty diff or empty edit set
    #[error("Nothing to save for {0}")]
    NothingToSave(String),

    /// A save for this row is already in flight
    #[error("Save already in progress for {0}")]
    AlreadySaving(String),

    /// Row missing from the cached table
    #[error("Row not found: {0}")]
    RowNotFound(String),

    /// Required create fields are empty
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Uniqueness precondition failed against cached rows
    #[error("{0}")]
    Duplicate(String),

    /// Backend rejected the request
    #[error(transparent)]
    Remote(#[from] ApiError),

    /// Unknown entity slug
    #[error("Unknown entity kind: {0}")]
    UnknownKind(String),

    /// Malformed `"{type}:{id}"` key
    #[error("Invalid row key: {0}")]
    InvalidRowKey(String),
}

/// Result type for admin operations
pub type Result<T> = std::result::Result<T, Error>;
