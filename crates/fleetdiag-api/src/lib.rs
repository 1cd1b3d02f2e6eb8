//! fleetdiag-api: the HTTP surface over the diagnostic log store.
//!
//! All routes live under `<api_prefix>/logs` and answer with the
//! [`ApiResponse`] envelope. The store sits behind a single
//! [`tokio::sync::RwLock`]: reads share it, uploads and clears take it
//! exclusively, so appends from concurrent uploads never interleave. File
//! writes run on the blocking pool while the write guard is held.

pub mod handlers;
pub mod response;
pub mod webhook;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::sync::RwLock;

use fleetdiag_core::config::ServerConfig;
use fleetdiag_core::{Ingestor, LogStore};

pub use response::{ApiError, ApiResponse};

/// Shared state for every handler.
pub struct AppState {
    pub store: Arc<RwLock<LogStore>>,
    pub ingestor: Ingestor,
}

impl AppState {
    pub fn new(store: LogStore, ingestor: Ingestor) -> Self {
        Self { store: Arc::new(RwLock::new(store)), ingestor }
    }
}

/// Where the log routes are nested, e.g. `/api/logs`.
pub fn logs_mount(api_prefix: &str) -> String {
    let prefix = api_prefix.trim_matches('/');
    if prefix.is_empty() {
        "/logs".to_string()
    } else {
        format!("/{prefix}/logs")
    }
}

/// Build the router with all routes mounted.
pub fn build_app(state: Arc<AppState>, server: &ServerConfig) -> Router {
    let logs = Router::new()
        .route("/", get(handlers::search_logs).delete(handlers::clear_logs))
        .route("/all", get(handlers::all_logs))
        .route("/count", get(handlers::logs_count))
        .route("/test", get(handlers::liveness))
        .route("/db-info", get(handlers::db_info))
        .route("/vehicles", get(handlers::vehicles))
        .route("/vehicles/summary", get(handlers::fleet_summary))
        .route("/vehicle/{id}", get(handlers::vehicle_logs))
        .route("/vehicle/{id}/stats", get(handlers::vehicle_stats))
        .route("/upload", post(handlers::upload_logs))
        .route("/upload-file", post(handlers::upload_file))
        .route("/webhook", post(handlers::webhook));

    Router::new()
        .nest(&logs_mount(&server.api_prefix), logs)
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .with_state(state)
}
