//! In-process [`UsersApi`] fake backed by the real services.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::StatusCode;

use roster_core::models::Fields;
use roster_core::paging::PageRequest;
use roster_core::responses::{ClearResponse, ImportResponse, ListResponse};
use roster_core::store::memory::InMemoryStore;
use roster_core::store::RecordStore;

use crate::clear::clear_all;
use crate::client::{ClientError, UsersApi};
use crate::import::parse_csv;
use crate::query::list_records;

pub struct FakeApi {
    pub store: InMemoryStore,
    pub failing: AtomicBool,
    pub list_calls: AtomicUsize,
    pub last_list: std::sync::Mutex<Option<PageRequest>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            store: InMemoryStore::new(),
            failing: AtomicBool::new(false),
            list_calls: AtomicUsize::new(0),
            last_list: std::sync::Mutex::new(None),
        }
    }

    pub async fn seed(&self, rows: Vec<Fields>) {
        self.store.insert_many(rows).await.unwrap();
    }

    pub fn fail(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), ClientError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(ClientError::Server {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "store unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

pub fn person(first: &str, last: &str, email: &str) -> Fields {
    Fields::from([
        ("first_name".to_string(), first.to_string()),
        ("last_name".to_string(), last.to_string()),
        ("email".to_string(), email.to_string()),
    ])
}

#[async_trait]
impl UsersApi for FakeApi {
    async fn import_csv(
        &self,
        _file_name: &str,
        _mime: &str,
        bytes: Vec<u8>,
    ) -> Result<ImportResponse, ClientError> {
        self.check()?;
        let rows = parse_csv(bytes.as_slice())
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(|e| ClientError::Server {
                status: StatusCode::BAD_REQUEST,
                message: format!("Error parsing CSV: {}", e),
            })?;
        let count = rows.len() as u64;
        if !rows.is_empty() {
            self.store.insert_many(rows).await.unwrap();
        }
        Ok(ImportResponse {
            message: "Users imported successfully".to_string(),
            count,
        })
    }

    async fn list_users(&self, req: PageRequest) -> Result<ListResponse, ClientError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_list.lock().unwrap() = Some(req);
        self.check()?;
        Ok(list_records(&self.store, req).await.unwrap())
    }

    async fn clear_users(&self) -> Result<ClearResponse, ClientError> {
        self.check()?;
        let report = clear_all(&self.store).await.unwrap();
        Ok(report.into_response("All users cleared successfully"))
    }
}
