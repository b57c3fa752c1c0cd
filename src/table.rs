//! Table widget: paginated, searchable view over the server's records.
//!
//! Two fetch modes:
//!
//! - **Server mode** (no search term): asks the server for exactly one
//!   `page/limit` window. When the server reports a different current page
//!   (the request was past the end), the widget adopts it and fetches once
//!   more.
//! - **Search mode**: fetches the whole set once (`page=1&limit=<cap>`),
//!   filters it locally with [`filter_records`], and pages the matches
//!   with [`paginate_slice`]. The fetched set is cached until the term
//!   changes or [`TableWidget::data_changed`] is called.
//!
//! Any state change marks the widget stale; [`TableWidget::ensure_fresh`]
//! performs the fetch. Mutations elsewhere (an upload) notify the table by
//! calling `data_changed`, passed in as a callback.

use roster_core::models::Record;
use roster_core::paging::{paginate_slice, Page, PageRequest};
use roster_core::search::{filter_records, normalize_term};

use crate::client::{ClientError, UsersApi};
use crate::config::LIMIT_CHOICES;
use crate::notice::Notice;

/// Widest a rendered cell may get before it is truncated.
const MAX_CELL_WIDTH: usize = 32;

const HEADERS: [&str; 6] = ["#", "Name", "Email", "Company", "Phone", "Location"];

#[derive(Debug)]
pub struct TableWidget {
    page: u64,
    limit: u64,
    search: String,
    search_cap: u64,
    rows: Vec<Record>,
    total_pages: u64,
    total_users: u64,
    loading: bool,
    stale: bool,
    search_cache: Option<Vec<Record>>,
}

impl TableWidget {
    pub fn new(limit: u64, search_cap: u64) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            search: String::new(),
            search_cap: search_cap.max(1),
            rows: Vec::new(),
            total_pages: 1,
            total_users: 0,
            loading: false,
            stale: true,
            search_cache: None,
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub fn total_users(&self) -> u64 {
        self.total_users
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    fn is_searching(&self) -> bool {
        normalize_term(&self.search).is_some()
    }

    /// Last navigable page; an empty result still has one (empty) page.
    fn last_page(&self) -> u64 {
        self.total_pages.max(1)
    }

    fn set_page(&mut self, page: u64) -> bool {
        if page == self.page {
            return false;
        }
        self.page = page;
        self.stale = true;
        true
    }

    pub fn first(&mut self) -> bool {
        self.set_page(1)
    }

    pub fn prev(&mut self) -> bool {
        if self.page > 1 {
            self.set_page(self.page - 1)
        } else {
            false
        }
    }

    pub fn next(&mut self) -> bool {
        if self.page < self.last_page() {
            self.set_page(self.page + 1)
        } else {
            false
        }
    }

    pub fn last(&mut self) -> bool {
        self.set_page(self.last_page())
    }

    /// Jump to `page`, clamped into `1..=last page`.
    pub fn goto(&mut self, page: u64) -> bool {
        self.set_page(page.clamp(1, self.last_page()))
    }

    /// Change the page size. Only the offered choices are accepted.
    pub fn set_limit(&mut self, limit: u64) -> Result<(), Notice> {
        if !LIMIT_CHOICES.contains(&limit) {
            return Err(Notice::error(format!(
                "Page size must be one of {:?}",
                LIMIT_CHOICES
            )));
        }
        if limit != self.limit {
            self.limit = limit;
            self.page = 1;
            self.stale = true;
        }
        Ok(())
    }

    /// Change the search term; an empty term returns to server mode.
    pub fn set_search(&mut self, term: &str) {
        if term == self.search {
            return;
        }
        self.search = term.to_string();
        self.search_cache = None;
        self.page = 1;
        self.stale = true;
    }

    /// The underlying records changed; drop cached data and refetch.
    pub fn data_changed(&mut self) {
        self.search_cache = None;
        self.stale = true;
    }

    /// Refresh if anything changed since the last successful fetch.
    pub async fn ensure_fresh(&mut self, api: &dyn UsersApi) -> Result<(), Notice> {
        if self.stale {
            self.refresh(api).await
        } else {
            Ok(())
        }
    }

    /// Fetch the current view. On failure the previous rows stay on screen.
    pub async fn refresh(&mut self, api: &dyn UsersApi) -> Result<(), Notice> {
        self.loading = true;
        let result = if self.is_searching() {
            self.refresh_search(api).await
        } else {
            self.refresh_server(api).await
        };
        self.loading = false;

        match result {
            Ok(()) => {
                self.stale = false;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "fetching users failed");
                Err(Notice::error(format!("Error fetching users: {}", e)))
            }
        }
    }

    async fn refresh_server(&mut self, api: &dyn UsersApi) -> Result<(), ClientError> {
        let mut resp = api.list_users(PageRequest::new(self.page, self.limit)).await?;
        if resp.current_page != self.page {
            self.page = resp.current_page;
            resp = api.list_users(PageRequest::new(self.page, self.limit)).await?;
        }
        self.rows = resp.users;
        self.total_pages = resp.total_pages;
        self.total_users = resp.total_users;
        Ok(())
    }

    async fn refresh_search(&mut self, api: &dyn UsersApi) -> Result<(), ClientError> {
        let all = match self.search_cache.take() {
            Some(cached) => cached,
            None => {
                let resp = api.list_users(PageRequest::new(1, self.search_cap)).await?;
                if resp.total_users > resp.users.len() as u64 {
                    tracing::warn!(
                        total = resp.total_users,
                        fetched = resp.users.len(),
                        "search covers only the first {} records",
                        self.search_cap
                    );
                }
                resp.users
            }
        };

        let matches = filter_records(&all, &self.search);
        let mut page: Page<Record> =
            paginate_slice(&matches, PageRequest::new(self.page, self.limit));
        if page.current_page != self.page {
            self.page = page.current_page;
            page = paginate_slice(&matches, PageRequest::new(self.page, self.limit));
        }

        self.rows = page.items;
        self.total_pages = page.total_pages;
        self.total_users = page.total;
        self.search_cache = Some(all);
        Ok(())
    }

    /// Delete every record on the server. Confirmation is the caller's job.
    pub async fn clear(&mut self, api: &dyn UsersApi) -> Notice {
        match api.clear_users().await {
            Ok(resp) => {
                self.data_changed();
                self.page = 1;
                Notice::success(format!("{} ({} removed)", resp.message, resp.removed_count))
            }
            Err(e) => {
                tracing::warn!(error = %e, "clearing users failed");
                Notice::error(e.server_message().unwrap_or("Error clearing users"))
            }
        }
    }

    /// Render the current rows as a plain-text table with a pager footer.
    pub fn render(&self) -> String {
        let mut out = String::new();

        if self.rows.is_empty() {
            if self.is_searching() {
                out.push_str(&format!("No records match \"{}\"\n", self.search.trim()));
            } else {
                out.push_str("No records found\n");
                out.push_str("Upload a CSV file to populate the database.\n");
            }
        } else {
            let offset = (self.page - 1).saturating_mul(self.limit);
            let body: Vec<[String; 6]> = self
                .rows
                .iter()
                .enumerate()
                .map(|(i, r)| row_cells(offset + i as u64 + 1, r))
                .collect();

            let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.chars().count()).collect();
            for cells in &body {
                for (w, cell) in widths.iter_mut().zip(cells.iter()) {
                    *w = (*w).max(cell.chars().count());
                }
            }

            push_line(&mut out, HEADERS.iter().map(|h| h.to_string()), &widths);
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            push_line(&mut out, rule.into_iter(), &widths);
            for cells in body {
                push_line(&mut out, cells.into_iter(), &widths);
            }
        }

        out.push_str(&format!(
            "Page {} of {} | {} records | {} per page",
            self.page,
            self.last_page(),
            self.total_users,
            self.limit
        ));
        if self.is_searching() {
            out.push_str(&format!(" | search: \"{}\"", self.search.trim()));
        }
        out.push('\n');
        out
    }
}

fn row_cells(serial: u64, r: &Record) -> [String; 6] {
    let name = format!("{} {}", r.field("first_name"), r.field("last_name"))
        .trim()
        .to_string();
    let phone = match (r.field("phone1"), r.field("phone2")) {
        (p1, "") => p1.to_string(),
        ("", p2) => p2.to_string(),
        (p1, p2) => format!("{} / {}", p1, p2),
    };
    let location = [r.field("city"), r.field("state")]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    [
        serial.to_string(),
        truncate(&name),
        truncate(r.field("email")),
        truncate(r.field("company_name")),
        truncate(&phone),
        truncate(&location),
    ]
}

fn truncate(s: &str) -> String {
    if s.chars().count() <= MAX_CELL_WIDTH {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(MAX_CELL_WIDTH - 1).collect();
        t.push('…');
        t
    }
}

fn push_line(out: &mut String, cells: impl Iterator<Item = String>, widths: &[usize]) {
    let padded: Vec<String> = cells
        .zip(widths.iter())
        .map(|(c, w)| {
            let pad = w.saturating_sub(c.chars().count());
            format!("{}{}", c, " ".repeat(pad))
        })
        .collect();
    out.push_str(padded.join("  ").trim_end());
    out.push('\n');
}
