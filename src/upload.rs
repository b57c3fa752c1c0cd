//! Upload widget: pick a CSV file, validate it, and submit it.
//!
//! Validation happens client-side before any bytes are sent: the file must
//! exist and be named `*.csv` or declared `text/csv`. The same rule is
//! enforced again by the server.

use std::path::{Path, PathBuf};

use roster_core::file_type::{is_csv_upload, CSV_MIME};
use roster_core::responses::ImportResponse;

use crate::client::UsersApi;
use crate::notice::Notice;

/// A file accepted by [`UploadWidget::select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub mime: String,
}

#[derive(Debug, Default)]
pub struct UploadWidget {
    selected: Option<SelectedFile>,
    uploading: bool,
}

impl UploadWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// Validate and select `path`. A rejected file leaves no selection.
    ///
    /// `declared_mime` stands in for the type a browser reports; without
    /// it, `.csv` files are sent as `text/csv`.
    pub fn select(
        &mut self,
        path: &Path,
        declared_mime: Option<&str>,
    ) -> Result<&SelectedFile, Notice> {
        self.selected = None;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        if !is_csv_upload(Some(&name), declared_mime) {
            return Err(Notice::error("Please upload a valid CSV file"));
        }
        if !path.is_file() {
            return Err(Notice::error(format!("File not found: {}", path.display())));
        }

        let mime = declared_mime.unwrap_or(CSV_MIME).to_string();
        Ok(self.selected.insert(SelectedFile {
            path: path.to_path_buf(),
            name,
            mime,
        }))
    }

    pub fn remove(&mut self) {
        self.selected = None;
    }

    /// Submit the selected file.
    ///
    /// On success the selection is cleared and `on_imported` runs with the
    /// server's summary; that is how listeners learn the data changed. On
    /// failure the selection is kept for a retry and `on_imported` is not
    /// called.
    pub async fn upload<F>(&mut self, api: &dyn UsersApi, on_imported: F) -> Notice
    where
        F: FnOnce(&ImportResponse),
    {
        let Some(file) = self.selected.clone() else {
            return Notice::error("Select a CSV file first");
        };

        let bytes = match tokio::fs::read(&file.path).await {
            Ok(b) => b,
            Err(e) => return Notice::error(format!("Error reading {}: {}", file.path.display(), e)),
        };

        self.uploading = true;
        let result = api.import_csv(&file.name, &file.mime, bytes).await;
        self.uploading = false;

        match result {
            Ok(resp) => {
                self.selected = None;
                on_imported(&resp);
                Notice::success(format!("{} ({} records)", resp.message, resp.count))
            }
            Err(e) => {
                tracing::warn!(file = %file.name, error = %e, "upload failed");
                Notice::error(e.server_message().unwrap_or("Error importing users"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;
    use roster_core::store::RecordStore;
    use tempfile::TempDir;

    fn write(tmp: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = tmp.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_rejects_non_csv() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "users.xlsx", "x");
        let mut widget = UploadWidget::new();
        let err = widget.select(&path, None).unwrap_err();
        assert_eq!(err, Notice::error("Please upload a valid CSV file"));
        assert!(widget.selected().is_none());
    }

    #[test]
    fn test_accepts_declared_csv_mime() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "export", "a\n1\n");
        let mut widget = UploadWidget::new();
        let selected = widget.select(&path, Some("text/csv")).unwrap();
        assert_eq!(selected.name, "export");
        assert_eq!(selected.mime, "text/csv");
    }

    #[test]
    fn test_rejects_missing_file() {
        let tmp = TempDir::new().unwrap();
        let mut widget = UploadWidget::new();
        let err = widget.select(&tmp.path().join("nope.csv"), None).unwrap_err();
        assert!(err.is_error());
        assert!(err.message().contains("File not found"));
    }

    #[test]
    fn test_bad_selection_replaces_good_one() {
        let tmp = TempDir::new().unwrap();
        let good = write(&tmp, "good.csv", "a\n1\n");
        let bad = write(&tmp, "bad.txt", "a\n1\n");
        let mut widget = UploadWidget::new();
        widget.select(&good, None).unwrap();
        assert!(widget.select(&bad, None).is_err());
        assert!(widget.selected().is_none());
    }

    #[tokio::test]
    async fn test_upload_success_fires_callback_and_clears() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "people.csv", "first_name,email\nAda,a@x.com\nGrace,g@x.com\n");
        let api = FakeApi::new();
        let mut widget = UploadWidget::new();
        widget.select(&path, None).unwrap();

        let mut seen = None;
        let notice = widget.upload(&api, |resp| seen = Some(resp.count)).await;

        assert!(!notice.is_error(), "{}", notice);
        assert!(notice.message().contains("2 records"));
        assert_eq!(seen, Some(2));
        assert!(widget.selected().is_none());
        assert_eq!(api.store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_upload_failure_keeps_selection() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "people.csv", "email\na@x.com\n");
        let api = FakeApi::new();
        api.fail(true);
        let mut widget = UploadWidget::new();
        widget.select(&path, None).unwrap();

        let mut called = false;
        let notice = widget.upload(&api, |_| called = true).await;

        assert_eq!(notice, Notice::error("store unavailable"));
        assert!(!called);
        assert!(widget.selected().is_some());
        assert!(!widget.is_uploading());
    }

    #[tokio::test]
    async fn test_upload_without_selection() {
        let api = FakeApi::new();
        let mut widget = UploadWidget::new();
        let notice = widget.upload(&api, |_| {}).await;
        assert!(notice.is_error());
        assert_eq!(api.store.count().await.unwrap(), 0);
    }
}
