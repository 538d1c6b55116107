//! REST implementation of the admin table API
//!
//! Each entity kind lives under `/api/admin/{slug}`:
//!
//! | Operation | Request                 |
//! |-----------|-------------------------|
//! | list      | `GET    /{slug}?search=&limit=&offset=` |
//! | create    | `POST   /{slug}`        |
//! | update    | `PUT    /{slug}/{id}`   |
//! | delete    | `DELETE /{slug}/{id}`   |

use crate::http::ApiClient;
use idlerealm_admin::{AdminApi, ApiError, EntityKind, ListPage, ListQuery, Row};
use idlerealm_core::ValueMap;
use serde::de::IgnoredAny;
use serde::Deserialize;
use tracing::debug;

/// List endpoints answer either a page object or a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListBody {
    Paged {
        items: Vec<Row>,
        #[serde(default)]
        total: Option<usize>,
    },
    Bare(Vec<Row>),
}

impl From<ListBody> for ListPage {
    fn from(body: ListBody) -> Self {
        match body {
            ListBody::Paged { items, total } => {
                let total = total.unwrap_or(items.len());
                ListPage { items, total }
            }
            ListBody::Bare(items) => ListPage {
                total: items.len(),
                items,
            },
        }
    }
}

/// Admin tables over HTTP
#[derive(Debug, Clone)]
pub struct HttpAdminApi {
    client: ApiClient,
}

impl HttpAdminApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

fn collection(kind: EntityKind) -> String {
    format!("/api/admin/{}", kind.slug())
}

fn member(kind: EntityKind, id: u64) -> String {
    format!("/api/admin/{}/{id}", kind.slug())
}

/// The stored row when an update answers with one
///
/// Any 2xx is a committed write; acknowledgements such as
/// `{"success": true}` or an empty body carry no row.
fn stored_row(body: serde_json::Value) -> Option<Row> {
    if body.is_null() {
        return None;
    }
    match serde_json::from_value(body) {
        Ok(row) => Some(row),
        Err(err) => {
            debug!("update answered without a row: {err}");
            None
        }
    }
}

impl AdminApi for HttpAdminApi {
    async fn list(&self, kind: EntityKind, query: &ListQuery) -> Result<ListPage, ApiError> {
        let mut params = Vec::new();
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(("search", search.to_string()));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(offset) = query.offset {
            params.push(("offset", offset.to_string()));
        }
        let body: ListBody = self.client.get(&collection(kind), &params).await?;
        Ok(body.into())
    }

    async fn create(&self, kind: EntityKind, payload: &ValueMap) -> Result<Row, ApiError> {
        self.client.post(&collection(kind), Some(payload)).await
    }

    async fn update(&self, kind: EntityKind, id: u64, payload: &ValueMap) -> Result<Option<Row>, ApiError> {
        let body: serde_json::Value = self.client.put(&member(kind, id), payload).await?;
        Ok(stored_row(body))
    }

    async fn delete(&self, kind: EntityKind, id: u64) -> Result<(), ApiError> {
        self.client
            .delete::<IgnoredAny>(&member(kind, id))
            .await
            .map(|_| ())
    }
}
