//! SQLite-backed [`RecordStore`] implementation.
//!
//! Each record is one row in the `records` table: store-owned columns for
//! identity and timestamps, plus the row's schema-less fields as a JSON
//! object in `fields_json`.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use roster_core::models::{Fields, Record};
use roster_core::store::{FindOptions, RecordStore};

use crate::db;
use crate::migrate;

/// SQLite implementation of the [`RecordStore`] trait.
///
/// The pool sits behind a lock only so [`reopen`](RecordStore::reopen) can
/// swap it; every operation clones the pool handle and releases the lock
/// before touching the database.
pub struct SqliteStore {
    path: PathBuf,
    pool: RwLock<SqlitePool>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and ensure the schema.
    pub async fn open(path: &Path) -> Result<Self> {
        let pool = db::connect_path(path).await?;
        migrate::ensure_schema(&pool).await?;
        Ok(Self {
            path: path.to_path_buf(),
            pool: RwLock::new(pool),
        })
    }

    fn pool(&self) -> Result<SqlitePool> {
        self.pool
            .read()
            .map(|p| p.clone())
            .map_err(|_| anyhow!("sqlite store lock poisoned"))
    }
}

fn millis_to_utc(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| anyhow!("invalid timestamp in store: {}", ms))
}

fn row_to_record(row: &SqliteRow) -> Result<Record> {
    let id: String = row.get("id");
    let fields_json: String = row.get("fields_json");
    let fields: Fields = serde_json::from_str(&fields_json)
        .with_context(|| format!("corrupt fields_json for record {}", id))?;
    Ok(Record {
        created_at: millis_to_utc(row.get("created_at"))?,
        updated_at: millis_to_utc(row.get("updated_at"))?,
        id,
        fields,
    })
}

fn to_sql_int(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert_many(&self, rows: Vec<Fields>) -> Result<Vec<Record>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let records: Vec<Record> = rows.into_iter().map(|f| Record::new(f, now)).collect();

        let pool = self.pool()?;
        let mut tx = pool.begin().await?;
        for record in &records {
            sqlx::query(
                "INSERT INTO records (id, created_at, updated_at, fields_json) VALUES (?, ?, ?, ?)",
            )
            .bind(&record.id)
            .bind(record.created_at.timestamp_millis())
            .bind(record.updated_at.timestamp_millis())
            .bind(serde_json::to_string(&record.fields)?)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(records)
    }

    async fn find(&self, opts: FindOptions) -> Result<Vec<Record>> {
        let sql = "SELECT id, created_at, updated_at, fields_json FROM records \
                   ORDER BY created_at DESC, seq DESC LIMIT ? OFFSET ?";
        // SQLite treats a negative LIMIT as "no limit".
        let limit = opts.limit.map(to_sql_int).unwrap_or(-1);

        let pool = self.pool()?;
        let rows = sqlx::query(sql)
            .bind(limit)
            .bind(to_sql_int(opts.skip))
            .fetch_all(&pool)
            .await?;

        rows.iter().map(row_to_record).collect()
    }

    async fn count(&self) -> Result<u64> {
        let pool = self.pool()?;
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM records")
            .fetch_one(&pool)
            .await?;
        Ok(n.max(0) as u64)
    }

    async fn remove_all(&self) -> Result<u64> {
        let pool = self.pool()?;
        let result = sqlx::query("DELETE FROM records").execute(&pool).await?;
        Ok(result.rows_affected())
    }

    async fn reopen(&self) -> Result<()> {
        let fresh = db::connect_path(&self.path).await?;
        migrate::ensure_schema(&fresh).await?;

        let stale = {
            let mut guard = self
                .pool
                .write()
                .map_err(|_| anyhow!("sqlite store lock poisoned"))?;
            std::mem::replace(&mut *guard, fresh)
        };
        stale.close().await;

        tracing::info!(path = %self.path.display(), "record store reopened");
        Ok(())
    }
}
