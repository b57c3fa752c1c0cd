//! # Roster
//!
//! Import CSV files into an embedded record store and browse them as a
//! paginated, searchable table.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  multipart   ┌──────────────┐  insert_many  ┌──────────┐
//! │ UploadWidget │─────────────▶│ CSV importer │──────────────▶│          │
//! └──────────────┘              └──────────────┘               │  SQLite  │
//! ┌──────────────┐  GET/DELETE  ┌──────────────┐  find/count   │ records  │
//! │ TableWidget  │─────────────▶│ query, clear │──────────────▶│          │
//! └──────────────┘              └──────────────┘  remove_all   └──────────┘
//!       client (roster CLI)          server (axum)
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! roster init                          # create database
//! roster serve                         # start HTTP server
//! roster upload ./people.csv           # import from another terminal
//! roster list --page 2 --limit 20
//! roster list --search "a@x"
//! roster browse                        # interactive table
//! roster clear
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Database schema migrations (idempotent) |
//! | [`sqlite_store`] | SQLite [`RecordStore`](roster_core::store::RecordStore) |
//! | [`import`] | CSV parsing and the import pipeline |
//! | [`query`] | Paginated listing |
//! | [`clear`] | Delete-all |
//! | [`server`] | HTTP server (Axum) with CORS |
//! | [`client`] | HTTP client behind the `UsersApi` trait |
//! | [`notice`] | Transient success/error notifications |
//! | [`upload`] | Upload widget: validate and submit a CSV file |
//! | [`table`] | Table widget: paging, search, rendering |
//! | [`browse`] | Interactive table session |

pub mod browse;
pub mod clear;
pub mod client;
pub mod config;
pub mod db;
pub mod import;
pub mod logging;
pub mod migrate;
pub mod notice;
pub mod query;
pub mod server;
pub mod sqlite_store;
pub mod table;
pub mod upload;

#[cfg(test)]
mod testing;

pub use roster_core::{models, paging, search, store};
