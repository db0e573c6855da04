//! API Handlers
//!
//! HTTP request handlers for each cache host endpoint.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tracing::debug;

use crate::cache::ExpiringStore;
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, ClearResponse, DeleteResponse, GetResponse, HealthResponse, PurgeResponse,
    SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// The store clone shares its entries with every other clone, so handlers
/// and the rest of the process see the same cache.
#[derive(Clone)]
pub struct AppState {
    pub cache: ExpiringStore<Value>,
}

impl AppState {
    /// Creates a new AppState around an existing store.
    pub fn new(cache: ExpiringStore<Value>) -> Self {
        Self { cache }
    }
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl_ms = req.ttl_ms.unwrap_or_else(|| state.cache.default_ttl_ms());
    state.cache.set(req.key.clone(), req.value, ttl_ms);
    debug!(key = %req.key, ttl_ms, "entry stored");

    Ok(Json(SetResponse::new(req.key, ttl_ms)))
}

/// Handler for GET /get/:key
///
/// Absent and stale keys both answer 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    if let Some(error_msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    match state.cache.get(&key) {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if let Some(error_msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let deleted = state.cache.delete(&key);
    Ok(Json(DeleteResponse::new(key, deleted)))
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear();
    Json(ClearResponse::new())
}

/// Handler for POST /purge
pub async fn purge_handler(State(state): State<AppState>) -> Json<PurgeResponse> {
    let removed = state.cache.purge_expired();
    Json(PurgeResponse { removed })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
