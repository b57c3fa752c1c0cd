//! Pagination arithmetic.
//!
//! One implementation serves both the server's store-backed listing and
//! the client's local pagination of search results, so page numbers and
//! counts always agree.
//!
//! Conventions:
//!
//! - Pages are 1-indexed; `skip = (page - 1) * limit`.
//! - `total_pages = ceil(total / limit)`; an empty collection has **0**
//!   pages. Clients show that as a single empty page.
//! - A page past the end is not an error. It yields no items, and the
//!   reported current page is clamped to `max(total_pages, 1)`.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// A validated `(page, limit)` pair. Both are always ≥ 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a request; zero values fall back to the defaults.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: if page == 0 { DEFAULT_PAGE } else { page },
            limit: if limit == 0 { DEFAULT_LIMIT } else { limit },
        }
    }

    /// Build a request from raw query-string values.
    ///
    /// Missing, non-numeric, zero, and negative values fall back to the
    /// defaults. See [`parse_positive`] for the accepted syntax.
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: parse_positive(page).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(limit).unwrap_or(DEFAULT_LIMIT),
        }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }

    /// The page actually served, given how many pages exist.
    pub fn served_page(&self, total_pages: u64) -> u64 {
        self.page.min(total_pages.max(1))
    }
}

/// Leniently parse a positive integer.
///
/// Leading whitespace and a `+` sign are allowed, and trailing garbage after
/// the digits is ignored (`"3abc"` → 3, `"2.9"` → 2). Values too large for
/// `u64` saturate. Returns `None` for empty, non-numeric, zero, or negative
/// input.
pub fn parse_positive(raw: Option<&str>) -> Option<u64> {
    let s = raw?.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);
    let digits: &str = &s[..s.bytes().take_while(u8::is_ascii_digit).count()];
    if digits.is_empty() {
        return None;
    }
    match digits.parse::<u64>() {
        Ok(0) => None,
        Ok(n) => Some(n),
        Err(_) => Some(u64::MAX),
    }
}

/// One page of items plus the bookkeeping a pager needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total: u64,
}

/// Paginate an in-memory slice with the same rules the server applies.
pub fn paginate_slice<T: Clone>(items: &[T], req: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let total_pages = req.total_pages(total);
    let start = usize::try_from(req.skip()).unwrap_or(usize::MAX);
    let page_items = items
        .iter()
        .skip(start)
        .take(usize::try_from(req.limit).unwrap_or(usize::MAX))
        .cloned()
        .collect();
    Page {
        items: page_items,
        current_page: req.served_page(total_pages),
        total_pages,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_or_bad_params() {
        assert_eq!(PageRequest::from_params(None, None), PageRequest::default());
        assert_eq!(
            PageRequest::from_params(Some("abc"), Some("")),
            PageRequest::new(1, 10)
        );
        assert_eq!(
            PageRequest::from_params(Some("0"), Some("-5")),
            PageRequest::new(1, 10)
        );
    }

    #[test]
    fn test_lenient_integer_prefix() {
        assert_eq!(parse_positive(Some("3abc")), Some(3));
        assert_eq!(parse_positive(Some(" +20")), Some(20));
        assert_eq!(parse_positive(Some("2.9")), Some(2));
        assert_eq!(
            parse_positive(Some("99999999999999999999999")),
            Some(u64::MAX)
        );
    }

    #[test]
    fn test_skip_and_total_pages() {
        let req = PageRequest::new(3, 10);
        assert_eq!(req.skip(), 20);
        assert_eq!(req.total_pages(0), 0);
        assert_eq!(req.total_pages(1), 1);
        assert_eq!(req.total_pages(10), 1);
        assert_eq!(req.total_pages(11), 2);
    }

    #[test]
    fn test_skip_saturates() {
        let req = PageRequest::new(u64::MAX, u64::MAX);
        assert_eq!(req.skip(), u64::MAX);
    }

    #[test]
    fn test_served_page_is_clamped() {
        let req = PageRequest::new(7, 10);
        assert_eq!(req.served_page(3), 3);
        assert_eq!(req.served_page(0), 1);
        assert_eq!(PageRequest::new(2, 10).served_page(5), 2);
    }

    #[test]
    fn test_paginate_slice_past_end_is_empty() {
        let items: Vec<u32> = (0..25).collect();
        let page = paginate_slice(&items, PageRequest::new(4, 10));
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 3);
        assert_eq!(page.total, 25);
    }

    #[test]
    fn test_page_sweep_reconstructs_sequence() {
        let items: Vec<u32> = (0..23).collect();
        for limit in 1..=25 {
            let first = paginate_slice(&items, PageRequest::new(1, limit));
            let mut swept = Vec::new();
            for page in 1..=first.total_pages {
                swept.extend(paginate_slice(&items, PageRequest::new(page, limit)).items);
            }
            assert_eq!(swept, items, "limit {}", limit);
        }
    }

    #[test]
    fn test_empty_slice_has_zero_pages() {
        let page = paginate_slice::<u32>(&[], PageRequest::default());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.current_page, 1);
        assert!(page.items.is_empty());
    }
}
