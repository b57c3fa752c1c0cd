//! HTTP server (Axum).
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/users/import` | Import a CSV file (multipart field `file`) |
//! | `GET`  | `/users?page=&limit=` | One newest-first page of records |
//! | `DELETE` | `/users` | Delete every record |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! The `/users` routes are also mounted under `/api`.
//!
//! # Error Contract
//!
//! Every failure returns a JSON body with a human-readable `message`; server
//! failures add the underlying cause as `error`:
//!
//! ```json
//! { "message": "Error importing users", "error": "database is locked" }
//! ```
//!
//! Client input problems (missing file, wrong type, unparseable CSV) are
//! `400`; store failures are `500`. Nothing is retried.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser client on
//! another port can call the API.

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tower_http::cors::{Any, CorsLayer};

use roster_core::file_type::is_csv_upload;
use roster_core::paging::PageRequest;
use roster_core::responses::{ClearResponse, ErrorResponse, ImportResponse, ListResponse};
use roster_core::store::RecordStore;

use crate::clear::clear_all;
use crate::config::Config;
use crate::import::{import_file, spool_path, ImportError};
use crate::query::list_records;
use crate::sqlite_store::SqliteStore;

/// Multipart field carrying the uploaded CSV.
pub const FILE_FIELD: &str = "file";

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// The one store handle for the process; handlers never open their own.
    pub store: Arc<dyn RecordStore>,
}

/// Starts the HTTP server against the configured SQLite database.
///
/// Opens (and if needed creates) the database, binds `[server].bind`, and
/// serves until Ctrl-C. On Unix, `SIGHUP` reopens the database file.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let store: Arc<dyn RecordStore> = Arc::new(SqliteStore::open(&config.db.path).await?);
    tracing::info!(db = %config.db.path.display(), "using SQLite record store");
    run_server_with_store(config, store).await
}

/// Starts the HTTP server with a caller-supplied store.
pub async fn run_server_with_store(
    config: &Config,
    store: Arc<dyn RecordStore>,
) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(&config.uploads.dir).await?;
    spawn_reopen_on_hangup(store.clone())?;

    let state = AppState {
        config: Arc::new(config.clone()),
        store,
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Build the application router for `state`.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let users = Router::new()
        .route("/users", get(handle_list).delete(handle_clear))
        .route("/users/import", post(handle_import));

    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .merge(users.clone())
        .nest("/api", users)
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
fn spawn_reopen_on_hangup(store: Arc<dyn RecordStore>) -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangups = signal(SignalKind::hangup())?;
    tokio::spawn(async move {
        while hangups.recv().await.is_some() {
            tracing::info!("SIGHUP received, reopening record store");
            if let Err(e) = store.reopen().await {
                tracing::error!(error = %format!("{:#}", e), "record store reopen failed");
            }
        }
    });
    Ok(())
}

#[cfg(not(unix))]
fn spawn_reopen_on_hangup(_store: Arc<dyn RecordStore>) -> anyhow::Result<()> {
    Ok(())
}

// ============ Error response ============

/// Handler error that renders as an [`ErrorResponse`].
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    error: Option<String>,
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            error: None,
        }
    }

    /// A 500 with a fixed user-facing message and the cause attached.
    fn internal(message: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        let message = message.into();
        let error = cause.to_string();
        tracing::error!(%error, "{}", message);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
            error: Some(error),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            message: self.message,
            error: self.error,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        if err.is_client_error() {
            tracing::warn!(error = %err, "import rejected");
            return Self::bad_request(err.to_string());
        }
        match err {
            ImportError::Store(cause) => {
                Self::internal("Error importing users", format!("{:#}", cause))
            }
            other => Self::internal("Error importing users", other),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        tracing::warn!(error = %err, "malformed upload");
        Self {
            status: err.status(),
            message: "Error reading upload".to_string(),
            error: Some(err.body_text()),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /users/import ============

/// Handler for `POST /users/import`.
///
/// Streams the `file` field to a spool file, then imports it. Other form
/// fields are ignored. Rejects with `400` when the body is not multipart,
/// has no `file` field, or carries a file that is neither named `*.csv` nor
/// declared `text/csv`.
async fn handle_import(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportResponse>, AppError> {
    let Ok(mut multipart) = multipart else {
        return Err(ImportError::MissingFile.into());
    };
    let mut spooled: Option<PathBuf> = None;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        if !is_csv_upload(field.file_name(), field.content_type()) {
            return Err(ImportError::NotCsv.into());
        }

        let path = spool_path(&state.config.uploads.dir);
        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(ImportError::from)?;
        while let Some(chunk) = field.chunk().await? {
            file.write_all(&chunk).await.map_err(ImportError::from)?;
        }
        file.flush().await.map_err(ImportError::from)?;
        spooled = Some(path);
        break;
    }

    let path = spooled.ok_or(ImportError::MissingFile)?;
    let outcome = import_file(state.store.as_ref(), &path).await?;

    Ok(Json(ImportResponse {
        message: "Users imported successfully".to_string(),
        count: outcome.count,
    }))
}

// ============ GET /users ============

/// Raw query parameters; parsed leniently into a [`PageRequest`] so bad
/// values fall back to defaults instead of failing the request.
#[derive(Debug, Deserialize)]
struct ListParams {
    page: Option<String>,
    limit: Option<String>,
}

async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, AppError> {
    let req = PageRequest::from_params(params.page.as_deref(), params.limit.as_deref());
    let body = list_records(state.store.as_ref(), req)
        .await
        .map_err(|e| AppError::internal("Error fetching users", format!("{:#}", e)))?;
    Ok(Json(body))
}

// ============ DELETE /users ============

async fn handle_clear(State(state): State<AppState>) -> Result<Json<ClearResponse>, AppError> {
    let report = clear_all(state.store.as_ref())
        .await
        .map_err(|e| AppError::internal("Error clearing users", format!("{:#}", e)))?;
    Ok(Json(report.into_response("All users cleared successfully")))
}
