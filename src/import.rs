//! CSV import pipeline: uploaded file → rows → one batch insert.
//!
//! The uploaded file is spooled to `uploads.dir` by the HTTP layer, then
//! [`import_file`] parses it on a blocking worker and hands every row to
//! the store in a single [`RecordStore::insert_many`] call. The spooled
//! file is deleted only when the import succeeds; on any failure it stays
//! behind for an operator to inspect.
//!
//! Imports are not idempotent. A client that retries after a timeout can
//! import the same file twice.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecordsIntoIter};
use uuid::Uuid;

use roster_core::models::Fields;
use roster_core::store::RecordStore;

/// Import failure, classified by who caused it.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Please upload a CSV file")]
    MissingFile,
    #[error("Please upload a valid CSV file")]
    NotCsv,
    #[error("Error parsing CSV: {0}")]
    Parse(#[from] csv::Error),
    #[error("Error reading upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error importing users: {0:#}")]
    Store(anyhow::Error),
}

impl ImportError {
    /// `true` for errors caused by the uploaded content rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingFile | Self::NotCsv | Self::Parse(_))
    }
}

/// Result of a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Number of records inserted (one per data row).
    pub count: u64,
}

/// Lazy iterator of CSV data rows keyed by header name.
///
/// The first line is the header. Every later line becomes one [`Fields`]
/// map. A row whose column count differs from the header's yields an error.
pub struct CsvRows<R: Read> {
    headers: Vec<String>,
    records: StringRecordsIntoIter<R>,
}

/// Start parsing CSV text from `reader`. Reads the header eagerly.
pub fn parse_csv<R: Read>(reader: R) -> Result<CsvRows<R>, csv::Error> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();
    Ok(CsvRows {
        headers,
        records: rdr.into_records(),
    })
}

impl<R: Read> CsvRows<R> {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = Result<Fields, csv::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(record.map(|rec| {
            self.headers
                .iter()
                .zip(rec.iter())
                .map(|(h, v)| (h.clone(), v.to_string()))
                .collect()
        }))
    }
}

/// Parse every row of the CSV file at `path`.
pub fn read_rows(path: &Path) -> Result<Vec<Fields>, ImportError> {
    let file = File::open(path)?;
    let rows = parse_csv(file)?.collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// A fresh, unique spool path inside `dir` for an incoming upload.
pub fn spool_path(dir: &Path) -> PathBuf {
    dir.join(format!("{}.csv", Uuid::new_v4()))
}

/// Import the spooled CSV file at `path` into `store`.
///
/// Zero data rows is a success with `count = 0` and no store call.
pub async fn import_file(
    store: &dyn RecordStore,
    path: &Path,
) -> Result<ImportOutcome, ImportError> {
    let owned = path.to_path_buf();
    let rows = tokio::task::spawn_blocking(move || read_rows(&owned))
        .await
        .map_err(|e| ImportError::Io(std::io::Error::other(e)))??;

    let count = rows.len() as u64;
    if !rows.is_empty() {
        store.insert_many(rows).await.map_err(ImportError::Store)?;
    }

    // The rows are committed at this point; failing the request now would
    // invite a duplicate import on retry.
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove spooled upload");
    }

    tracing::info!(count, "csv import committed");
    Ok(ImportOutcome { count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use roster_core::models::Record;
    use roster_core::store::memory::InMemoryStore;
    use roster_core::store::FindOptions;
    use tempfile::TempDir;

    struct FullDisk;

    #[async_trait]
    impl RecordStore for FullDisk {
        async fn insert_many(&self, _rows: Vec<Fields>) -> anyhow::Result<Vec<Record>> {
            anyhow::bail!("disk full")
        }

        async fn find(&self, _opts: FindOptions) -> anyhow::Result<Vec<Record>> {
            Ok(Vec::new())
        }

        async fn count(&self) -> anyhow::Result<u64> {
            Ok(0)
        }

        async fn remove_all(&self) -> anyhow::Result<u64> {
            Ok(0)
        }

        async fn reopen(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_rows_keyed_by_header() {
        let csv = "first_name,last_name,email\nAda,Lovelace,ada@x.com\nGrace,Hopper,grace@x.com\n";
        let rows: Vec<Fields> = parse_csv(csv.as_bytes())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["first_name"], "Ada");
        assert_eq!(rows[1]["email"], "grace@x.com");
    }

    #[test]
    fn test_bom_stripped_from_first_header() {
        let csv = "\u{feff}name,city\nAda,London\n";
        let parsed = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(parsed.headers()[0], "name");
        let rows: Vec<Fields> = parsed.collect::<Result<_, _>>().unwrap();
        assert_eq!(rows[0]["name"], "Ada");
    }

    #[test]
    fn test_quoted_fields() {
        let csv = "company_name,city\n\"Acme, Inc.\",\"New \"\"York\"\"\"\n";
        let rows: Vec<Fields> = parse_csv(csv.as_bytes())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows[0]["company_name"], "Acme, Inc.");
        assert_eq!(rows[0]["city"], "New \"York\"");
    }

    #[test]
    fn test_ragged_row_is_an_error() {
        let csv = "a,b\n1,2\n3\n";
        let result: Result<Vec<Fields>, _> = parse_csv(csv.as_bytes()).unwrap().collect();
        assert!(result.is_err());
    }

    #[test]
    fn test_header_only_has_no_rows() {
        let rows: Vec<Fields> = parse_csv("a,b\n".as_bytes())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_error_classification() {
        assert!(ImportError::MissingFile.is_client_error());
        assert!(ImportError::NotCsv.is_client_error());
        assert!(!ImportError::Store(anyhow::anyhow!("disk full")).is_client_error());
    }

    #[tokio::test]
    async fn test_import_removes_spool_on_success() {
        let tmp = TempDir::new().unwrap();
        let path = spool_path(tmp.path());
        std::fs::write(&path, "email\na@x.com\nb@x.com\nc@x.com\n").unwrap();

        let store = InMemoryStore::new();
        let outcome = import_file(&store, &path).await.unwrap();
        assert_eq!(outcome.count, 3);
        assert_eq!(store.count().await.unwrap(), 3);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_import_empty_file_counts_zero() {
        let tmp = TempDir::new().unwrap();
        let path = spool_path(tmp.path());
        std::fs::write(&path, "").unwrap();

        let store = InMemoryStore::new();
        let outcome = import_file(&store, &path).await.unwrap();
        assert_eq!(outcome.count, 0);
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_parse_failure_keeps_spool() {
        let tmp = TempDir::new().unwrap();
        let path = spool_path(tmp.path());
        std::fs::write(&path, "a,b\n1,2\n3\n").unwrap();

        let store = InMemoryStore::new();
        let err = import_file(&store, &path).await.unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));
        assert!(path.exists());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_keeps_spool() {
        let tmp = TempDir::new().unwrap();
        let path = spool_path(tmp.path());
        std::fs::write(&path, "a\n1\n").unwrap();

        let err = import_file(&FullDisk, &path).await.unwrap_err();
        assert!(matches!(err, ImportError::Store(_)));
        assert!(!err.is_client_error());
        assert_eq!(err.to_string(), "Error importing users: disk full");
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_missing_spool_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let store = InMemoryStore::new();
        let err = import_file(&store, &tmp.path().join("gone.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Io(_)));
        assert!(!err.is_client_error());
    }
}
