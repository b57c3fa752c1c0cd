//! JSON bodies of the HTTP API.
//!
//! Shared by the axum handlers that produce them and the client that
//! consumes them. Field names follow the wire format (camelCase).

use serde::{Deserialize, Serialize};

use crate::models::Record;
use crate::paging::Page;

/// `POST /users/import` success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResponse {
    pub message: String,
    pub count: u64,
}

/// `GET /users` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub users: Vec<Record>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_users: u64,
}

impl From<Page<Record>> for ListResponse {
    fn from(page: Page<Record>) -> Self {
        Self {
            users: page.items,
            current_page: page.current_page,
            total_pages: page.total_pages,
            total_users: page.total,
        }
    }
}

/// `DELETE /users` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub message: String,
    pub removed_count: u64,
    pub total_before: u64,
    pub total_after: u64,
}

/// Body of every 4xx/5xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    /// Underlying cause, present on server-side failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
