//! Client-side full-scan search.
//!
//! When a search term is active the table fetches the whole record set
//! (up to [`DEFAULT_SEARCH_CAP`]) and filters it locally with a
//! case-insensitive substring match over [`SEARCH_FIELDS`]. Results are
//! then paginated with [`crate::paging::paginate_slice`].
//!
//! This trades scalability for simplicity and only gives complete results
//! while the store holds no more records than the fetch cap.

use crate::models::Record;

/// Fields scanned by [`record_matches`].
pub const SEARCH_FIELDS: [&str; 8] = [
    "first_name",
    "last_name",
    "email",
    "company_name",
    "city",
    "state",
    "phone1",
    "phone2",
];

/// Default upper bound on records fetched for a full-scan search.
pub const DEFAULT_SEARCH_CAP: u64 = 10_000;

/// Normalize a raw search term: trimmed and lowercased, `None` if empty.
pub fn normalize_term(term: &str) -> Option<String> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Returns `true` if any searchable field contains `needle`.
///
/// `needle` must already be lowercased (see [`normalize_term`]).
pub fn record_matches(record: &Record, needle: &str) -> bool {
    SEARCH_FIELDS
        .iter()
        .any(|name| record.field(name).to_lowercase().contains(needle))
}

/// Filter `records` by `term`, preserving order.
///
/// An empty or whitespace-only term matches everything.
pub fn filter_records(records: &[Record], term: &str) -> Vec<Record> {
    match normalize_term(term) {
        None => records.to_vec(),
        Some(needle) => records
            .iter()
            .filter(|r| record_matches(r, &needle))
            .cloned()
            .collect(),
    }
}
