//! CSV upload acceptance rule, shared by the upload widget and the server.

/// MIME type browsers and most HTTP clients declare for CSV files.
pub const CSV_MIME: &str = "text/csv";

/// Returns `true` if an upload looks like a CSV file.
///
/// A file is accepted when its name ends in `.csv` (any case) **or** its
/// declared MIME type is `text/csv`. Either signal alone is enough, since
/// many clients send `application/octet-stream` for CSV files.
pub fn is_csv_upload(file_name: Option<&str>, mime: Option<&str>) -> bool {
    let by_name = file_name
        .map(|name| name.to_ascii_lowercase().ends_with(".csv"))
        .unwrap_or(false);
    let by_mime = mime
        .map(|m| {
            m.split(';')
                .next()
                .map(|essence| essence.trim().eq_ignore_ascii_case(CSV_MIME))
                .unwrap_or(false)
        })
        .unwrap_or(false);
    by_name || by_mime
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_csv_extension_any_case() {
        assert!(is_csv_upload(Some("users.csv"), None));
        assert!(is_csv_upload(
            Some("USERS.CSV"),
            Some("application/octet-stream")
        ));
    }

    #[test]
    fn test_accepts_csv_mime_with_params() {
        assert!(is_csv_upload(
            Some("export"),
            Some("text/csv; charset=utf-8")
        ));
    }

    #[test]
    fn test_rejects_other_files() {
        assert!(!is_csv_upload(
            Some("users.xlsx"),
            Some("application/vnd.ms-excel")
        ));
        assert!(!is_csv_upload(None, None));
        assert!(!is_csv_upload(Some("users.csv.txt"), Some("text/plain")));
    }
}
