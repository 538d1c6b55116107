//! Backend seam for admin tables
//!
//! The edit engine talks to the backend only through [`AdminApi`]. The HTTP
//! implementation lives in `idlerealm-client`; tests use an in-memory mock.

use crate::entity::EntityKind;
use crate::row::Row;
use idlerealm_core::ValueMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

/// Parameters of a list request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListQuery {
    /// Query with only a search term
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }
}

/// One page of rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    pub items: Vec<Row>,
    /// Total matching rows on the server, `items.len()` when unknown
    pub total: usize,
}

/// A rejected backend call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status, `None` for transport failures
    pub status: Option<u16>,
    /// Server-provided message, if the body carried one
    pub message: Option<String>,
}

impl ApiError {
    pub fn new(status: Option<u16>, message: Option<String>) -> Self {
        Self { status, message }
    }

    /// Failure before any response arrived
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: Some(message.into()),
        }
    }

    /// 401 and 403 mean the session is gone
    pub fn is_session_expired(&self) -> bool {
        matches!(self.status, Some(401 | 403))
    }

    /// The server message when present, else the operation's fallback
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, &self.message) {
            (Some(status), Some(message)) => write!(f, "HTTP {status}: {message}"),
            (Some(status), None) => write!(f, "HTTP {status}"),
            (None, Some(message)) => f.write_str(message),
            (None, None) => f.write_str("request failed"),
        }
    }
}

impl std::error::Error for ApiError {}

/// CRUD over the admin tables, one endpoint family per [`EntityKind`]
pub trait AdminApi {
    fn list(
        &self,
        kind: EntityKind,
        query: &ListQuery,
    ) -> impl Future<Output = Result<ListPage, ApiError>> + Send;

    fn create(
        &self,
        kind: EntityKind,
        payload: &ValueMap,
    ) -> impl Future<Output = Result<Row, ApiError>> + Send;

    /// Update a row; the backend may echo the stored row back
    fn update(
        &self,
        kind: EntityKind,
        id: u64,
        payload: &ValueMap,
    ) -> impl Future<Output = Result<Option<Row>, ApiError>> + Send;

    fn delete(&self, kind: EntityKind, id: u64) -> impl Future<Output = Result<(), ApiError>> + Send;
}
