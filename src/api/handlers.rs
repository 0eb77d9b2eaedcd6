//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;
use tokio::sync::Mutex;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{entry_size, SimpleLru};
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, GetResponse, HealthResponse, StatsResponse, WriteRequest, WriteResponse,
};

/// Application state shared across all handlers.
///
/// The cache is not thread-safe by itself, so every handler holds this one
/// lock for the whole operation. Lookups take it too since they reorder
/// recency.
#[derive(Clone)]
pub struct AppState {
    /// Lock-guarded cache
    pub cache: Arc<Mutex<SimpleLru>>,
}

impl AppState {
    /// Creates a new AppState with the given cache.
    pub fn new(cache: SimpleLru) -> Self {
        Self {
            cache: Arc::new(Mutex::new(cache)),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(SimpleLru::new(config.capacity))
    }
}

fn validate(req: &WriteRequest) -> Result<()> {
    match req.validate() {
        Some(error_msg) => Err(CacheError::InvalidRequest(error_msg)),
        None => Ok(()),
    }
}

fn too_large(cache: &SimpleLru, req: &WriteRequest) -> CacheError {
    CacheError::TooLarge {
        size: entry_size(req.key.as_bytes(), req.value.as_bytes()),
        capacity: cache.capacity(),
    }
}

/// Rejects requests the cache could never accept, before touching it.
fn check_write(cache: &SimpleLru, req: &WriteRequest) -> Result<()> {
    validate(req)?;
    if !cache.fits(req.key.as_bytes(), req.value.as_bytes()) {
        return Err(too_large(cache, req));
    }
    Ok(())
}

/// Handler for PUT /put
///
/// Inserts the key or overwrites its value.
pub async fn put_handler(
    State(state): State<AppState>,
    Json(req): Json<WriteRequest>,
) -> Result<Json<WriteResponse>> {
    validate(&req)?;
    let mut cache = state.cache.lock().await;

    // Put only refuses entries larger than the whole cache
    if !cache.put(req.key.as_bytes(), req.value.as_bytes()) {
        return Err(too_large(&cache, &req));
    }

    Ok(Json(WriteResponse::new(req.key)))
}

/// Handler for PUT /put_if_absent
///
/// Inserts the key only if it is not already cached.
pub async fn put_if_absent_handler(
    State(state): State<AppState>,
    Json(req): Json<WriteRequest>,
) -> Result<Json<WriteResponse>> {
    let mut cache = state.cache.lock().await;
    check_write(&cache, &req)?;

    if !cache.put_if_absent(req.key.as_bytes(), req.value.as_bytes()) {
        return Err(CacheError::AlreadyExists(req.key));
    }

    Ok(Json(WriteResponse::new(req.key)))
}

/// Handler for PUT /set
///
/// Updates the value of an existing key.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<WriteRequest>,
) -> Result<Json<WriteResponse>> {
    let mut cache = state.cache.lock().await;
    check_write(&cache, &req)?;

    if !cache.set(req.key.as_bytes(), req.value.as_bytes()) {
        return Err(CacheError::NotFound(req.key));
    }

    Ok(Json(WriteResponse::new(req.key)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let mut cache = state.cache.lock().await;

    match cache.get(key.as_bytes()) {
        Some(value) => {
            let response = GetResponse::new(key.as_str(), value);
            Ok(Json(response))
        }
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
///
/// Deletes a key from the cache.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let mut cache = state.cache.lock().await;

    if !cache.delete(key.as_bytes()) {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.lock().await;
    Json(StatsResponse::from(cache.stats()))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
