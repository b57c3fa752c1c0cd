//! # Roster Core
//!
//! Shared logic for Roster: the schema-less record model, pagination
//! arithmetic, the client-side search filter, CSV file-type checks, the JSON
//! response bodies of the HTTP API, and the
//! [`store::RecordStore`] abstraction with an in-memory implementation.
//!
//! This crate contains no tokio, sqlx, HTTP, or filesystem I/O. The server
//! and the terminal client both build on it, so paging and search behave
//! identically on either side of the wire.

pub mod file_type;
pub mod models;
pub mod paging;
pub mod responses;
pub mod search;
pub mod store;
