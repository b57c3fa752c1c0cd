//! Storage abstraction for Roster.
//!
//! The [`RecordStore`] trait covers every persistence operation the
//! importer, query, and clear services need, so the SQLite backend and the
//! in-memory backend are interchangeable.
//!
//! The store owns record identity: it assigns `_id`, `createdAt`, and
//! `updatedAt`, and defines the newest-first order used for listing.
//! Implementations must be `Send + Sync` to be shared across request
//! handlers behind an `Arc`.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Fields, Record};
use crate::paging::PageRequest;

/// Options for [`RecordStore::find`].
///
/// Windows are always taken over the newest-first order. Rows inserted by
/// the same `insert_many` share a timestamp; among them, later rows count
/// as newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FindOptions {
    pub skip: u64,
    /// `None` means no limit.
    pub limit: Option<u64>,
}

impl FindOptions {
    /// Newest-first window for one page.
    pub fn for_page(req: PageRequest) -> Self {
        Self {
            skip: req.skip(),
            limit: Some(req.limit),
        }
    }
}

/// Abstract record storage backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`insert_many`](RecordStore::insert_many) | Insert a batch of rows in one store operation |
/// | [`find`](RecordStore::find) | Ordered window over all records |
/// | [`count`](RecordStore::count) | Total number of records |
/// | [`remove_all`](RecordStore::remove_all) | Delete every record |
/// | [`reopen`](RecordStore::reopen) | Re-attach to the backing file after out-of-band changes |
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert all `rows` as one operation, returning the stored records in
    /// input order. Either every row is stored or none is.
    async fn insert_many(&self, rows: Vec<Fields>) -> Result<Vec<Record>>;

    async fn find(&self, opts: FindOptions) -> Result<Vec<Record>>;

    async fn count(&self) -> Result<u64>;

    /// Delete every record, returning how many were removed.
    async fn remove_all(&self) -> Result<u64>;

    /// Drop the current handle and reconnect to the backing storage.
    ///
    /// Call this when the backing file is known to have been replaced or
    /// deleted by something other than this process.
    async fn reopen(&self) -> Result<()>;
}
