//! Route handlers. Each one is a thin adapter over the core: extract, call,
//! wrap in the envelope.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::JsonRejection,
        Path, Query, State,
    },
    http::{header, HeaderMap},
    Json,
};
use serde::{Deserialize, Serialize};

use fleetdiag_core::{
    search, stats, Level, LogEntry, LogStore, SearchQuery, StoreError, StoreInfo, VehicleStats,
};

use crate::response::{ApiError, ApiResponse};
use crate::webhook;
use crate::AppState;

type Shared = State<Arc<AppState>>;
type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query string for `GET /logs`. Blank values are treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub vehicle: Option<String>,
    pub code: Option<String>,
    pub level: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_bound(name: &str, raw: &str) -> Result<chrono::DateTime<chrono::Utc>, ApiError> {
    fleetdiag_core::timestamp::parse_timestamp(raw)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid {name} date: {raw:?}")))
}

impl SearchParams {
    pub fn into_query(self) -> Result<SearchQuery, ApiError> {
        let mut query = SearchQuery::default();
        if let Some(raw) = present(self.vehicle) {
            query.vehicle = Some(parse_vehicle_id(&raw)?);
        }
        query.code = present(self.code);
        if let Some(raw) = present(self.level) {
            query.level = Some(
                raw.parse::<Level>()
                    .map_err(|err| ApiError::bad_request(err.to_string()))?,
            );
        }
        if let Some(raw) = present(self.from) {
            query.from = Some(parse_bound("from", &raw)?);
        }
        if let Some(raw) = present(self.to) {
            query.to = Some(parse_bound("to", &raw)?);
        }
        Ok(query)
    }
}

fn parse_vehicle_id(raw: &str) -> Result<u64, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid vehicle id: {raw:?}")))
}

/// Body of `POST /logs/upload`.
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Liveness {
    pub logs_count: usize,
}

// ---------------------------------------------------------------------------
// Shared ingestion path
// ---------------------------------------------------------------------------

/// Run a store mutation on the blocking pool, holding the write lock until
/// the file write finishes.
async fn mutate_store<T, F>(state: &AppState, failure: &'static str, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&mut LogStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let mut store = Arc::clone(&state.store).write_owned().await;
    tokio::task::spawn_blocking(move || op(&mut *store))
        .await
        .map_err(|err| ApiError::internal(failure, err))?
        .map_err(|err| ApiError::internal(failure, err))
}

/// Ingest `content` and append the accepted entries under the write lock.
async fn store_content(state: &AppState, content: &str) -> Result<usize, ApiError> {
    let batch = state.ingestor.ingest(content);
    let count = batch.count;
    let accepted = batch.accepted;
    mutate_store(state, "Failed to store logs", move |store| store.append(accepted)).await?;
    Ok(count)
}

// ---------------------------------------------------------------------------
// Read routes
// ---------------------------------------------------------------------------

pub async fn search_logs(
    State(state): Shared,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<LogEntry>> {
    let query = params.into_query()?;
    tracing::info!(?query, "searching logs");
    let store = state.store.read().await;
    let hits: Vec<LogEntry> = search::search(store.entries(), &query).into_iter().cloned().collect();
    let n = hits.len();
    Ok(ApiResponse::ok(format!("Found {n} logs matching criteria")).count(n).data(hits))
}

pub async fn all_logs(State(state): Shared) -> ApiResponse<Vec<LogEntry>> {
    let store = state.store.read().await;
    let sorted: Vec<LogEntry> = search::newest_first(store.entries()).into_iter().cloned().collect();
    let n = sorted.len();
    ApiResponse::ok(format!("Retrieved {n} log entries")).count(n).data(sorted)
}

pub async fn logs_count(State(state): Shared) -> ApiResponse<()> {
    let n = state.store.read().await.len();
    ApiResponse::ok(format!("Total logs: {n}")).count(n)
}

pub async fn liveness(State(state): Shared) -> ApiResponse<Liveness> {
    let logs_count = state.store.read().await.len();
    ApiResponse::ok("fleetdiag API is running")
        .data(Liveness { logs_count })
        .count(logs_count)
        .stamped()
}

pub async fn db_info(State(state): Shared) -> ApiResponse<StoreInfo> {
    let info = state.store.read().await.info();
    ApiResponse::ok("Database information").data(info)
}

pub async fn vehicles(State(state): Shared) -> ApiResponse<Vec<u64>> {
    let ids = stats::unique_vehicles(state.store.read().await.entries());
    let n = ids.len();
    ApiResponse::ok(format!("Found {n} unique vehicles")).count(n).data(ids)
}

pub async fn fleet_summary(State(state): Shared) -> ApiResponse<Vec<VehicleStats>> {
    let summary = stats::fleet_summary(state.store.read().await.entries());
    let n = summary.len();
    ApiResponse::ok(format!("Statistics for {n} vehicles")).count(n).data(summary)
}

pub async fn vehicle_logs(State(state): Shared, Path(id): Path<String>) -> ApiResult<Vec<LogEntry>> {
    let vehicle_id = parse_vehicle_id(&id)?;
    let store = state.store.read().await;
    let logs: Vec<LogEntry> = search::newest_first(store.entries())
        .into_iter()
        .filter(|e| e.vehicle_id == vehicle_id)
        .cloned()
        .collect();
    let n = logs.len();
    Ok(ApiResponse::ok(format!("Found {n} logs for vehicle {vehicle_id}")).count(n).data(logs))
}

pub async fn vehicle_stats(State(state): Shared, Path(id): Path<String>) -> ApiResult<VehicleStats> {
    let vehicle_id = parse_vehicle_id(&id)?;
    let stats = stats::vehicle_stats(state.store.read().await.entries(), vehicle_id);
    Ok(ApiResponse::ok(format!("Vehicle {vehicle_id} statistics")).data(stats))
}

// ---------------------------------------------------------------------------
// Write routes
// ---------------------------------------------------------------------------

pub async fn upload_logs(
    State(state): Shared,
    body: Result<Json<UploadRequest>, JsonRejection>,
) -> ApiResult<()> {
    let Json(request) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    if request.content.trim().is_empty() {
        return Err(ApiError::bad_request("content must not be empty"));
    }
    let count = store_content(&state, &request.content).await?;
    Ok(ApiResponse::ok(format!("Uploaded {count} log entries")).count(count).stamped())
}

pub async fn upload_file(
    State(state): Shared,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<()> {
    let mut multipart =
        multipart.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(err.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.log").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| ApiError::bad_request(err.body_text()))?;
        tracing::info!(%filename, bytes = bytes.len(), "file upload");
        let content = String::from_utf8_lossy(&bytes);
        let count = store_content(&state, &content).await?;
        return Ok(ApiResponse::ok(format!(
            "Uploaded {count} log entries from file: {filename}"
        ))
        .count(count)
        .filename(filename)
        .stamped());
    }

    Err(ApiError::bad_request("No file uploaded"))
}

pub async fn webhook(State(state): Shared, headers: HeaderMap, body: Bytes) -> ApiResult<()> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    tracing::info!(content_type, bytes = body.len(), "webhook received");
    let content = webhook::extract_content(content_type, &body)?;
    let count = store_content(&state, &content).await?;
    Ok(ApiResponse::ok(format!(
        "Webhook processed successfully. Uploaded {count} log entries"
    ))
    .count(count)
    .stamped())
}

pub async fn clear_logs(State(state): Shared) -> ApiResult<()> {
    mutate_store(&state, "Failed to clear logs", LogStore::clear).await?;
    Ok(ApiResponse::ok("All logs cleared successfully."))
}
