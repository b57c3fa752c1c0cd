//! In-memory [`RecordStore`] implementation for tests and ephemeral runs.
//!
//! Records live in a `Vec` behind `std::sync::RwLock`, in insertion order.
//! [`reopen`](RecordStore::reopen) is a no-op since there is no backing file.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;

use crate::models::{Fields, Record};

use super::{FindOptions, RecordStore};

/// In-memory record store.
pub struct InMemoryStore {
    records: RwLock<Vec<Record>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory record store lock poisoned")
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn insert_many(&self, rows: Vec<Fields>) -> Result<Vec<Record>> {
        let now = Utc::now();
        let inserted: Vec<Record> = rows.into_iter().map(|f| Record::new(f, now)).collect();
        let mut records = self.records.write().map_err(poisoned)?;
        records.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn find(&self, opts: FindOptions) -> Result<Vec<Record>> {
        let records = self.records.read().map_err(poisoned)?;
        let skip = usize::try_from(opts.skip).unwrap_or(usize::MAX);
        let take = opts
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        // Insertion order is creation order.
        let window: Vec<Record> = records
            .iter()
            .rev()
            .skip(skip)
            .take(take)
            .cloned()
            .collect();
        Ok(window)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.read().map_err(poisoned)?.len() as u64)
    }

    async fn remove_all(&self) -> Result<u64> {
        let mut records = self.records.write().map_err(poisoned)?;
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }

    async fn reopen(&self) -> Result<()> {
        Ok(())
    }
}
