use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use std::sync::{Arc, MutexGuard};
use std::time::Instant;

use crate::location::{LocationError, LocationRecord, RecordCache};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

#[derive(Debug)]
pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

impl From<LocationError> for ApiError {
    fn from(e: LocationError) -> Self {
        let status = match &e {
            LocationError::MalformedResponse(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LocationError::NotFound(_) => StatusCode::NOT_FOUND,
            LocationError::Io(_) | LocationError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status, e.to_string())
    }
}

fn lock_cache(state: &AppState) -> MutexGuard<'_, RecordCache> {
    state.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn log_request(method: &str, path: &str, outcome: &str, start: Instant) {
    log::info!(
        "{} {} -> {} ({:.1}ms)",
        method,
        path,
        outcome,
        start.elapsed().as_secs_f64() * 1000.0
    );
}

// ─── GET /health ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// ─── POST /api/records ───────────────────────────────────────────

pub async fn submit_record(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<LocationRecord>, ApiError> {
    let start = Instant::now();
    match LocationRecord::from_slice_with(&body, &state.options) {
        Ok(record) => {
            lock_cache(&state).put(&record);
            log_request("POST", "/api/records", record.ip(), start);
            Ok(Json(record))
        }
        Err(e) => {
            log::warn!("rejected payload: {}", e);
            log_request("POST", "/api/records", "malformed", start);
            Err(e.into())
        }
    }
}

// ─── GET /api/records/{ip} ───────────────────────────────────────

pub async fn cached_record(
    State(state): State<Arc<AppState>>,
    Path(ip): Path<String>,
) -> Result<Json<LocationRecord>, ApiError> {
    let start = Instant::now();
    let found = lock_cache(&state).get(&ip);
    let path = format!("/api/records/{}", ip);
    match found {
        Some(record) => {
            log_request("GET", &path, "hit", start);
            Ok(Json(record))
        }
        None => {
            log_request("GET", &path, "miss", start);
            Err(LocationError::NotFound(ip).into())
        }
    }
}

// ─── GET /api/latest ─────────────────────────────────────────────

pub async fn latest_record(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LocationRecord>, ApiError> {
    let start = Instant::now();
    let found = lock_cache(&state).most_recent();
    log_request("GET", "/api/latest", if found.is_some() { "hit" } else { "miss" }, start);
    found
        .map(Json)
        .ok_or_else(|| LocationError::NotFound("latest".into()).into())
}
