//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::cache::{CacheStore, SharedCache};
use crate::config::Config;
use crate::error::{CacheError, ConfigError, Result};
use crate::models::{
    validate_key, ClearResponse, DeleteResponse, GetResponse, HealthResponse, MgetRequest,
    MgetResponse, SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// Values are stored as opaque JSON documents.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache store
    pub cache: SharedCache<Value>,
}

impl AppState {
    /// Creates a new AppState with the given cache store.
    pub fn new(cache: CacheStore<Value>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> std::result::Result<Self, ConfigError> {
        Ok(Self::new(CacheStore::new(config.cache.clone())?))
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair in the cache with optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut cache = state.cache.write().await;
    cache.set(req.key.clone(), req.value, req.ttl);

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key. Expired and early-expired
/// entries answer 404 like absent ones.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Write lock: a read touches eviction order and counters
    let mut cache = state.cache.write().await;

    match cache.get(&key) {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for POST /mget
///
/// Repeated keys are looked up once, so each distinct key counts a single
/// hit or miss.
pub async fn mget_handler(
    State(state): State<AppState>,
    Json(req): Json<MgetRequest>,
) -> Result<Json<MgetResponse>> {
    if let Some(error_msg) = req.keys.iter().find_map(|key| validate_key(key)) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let keys: Vec<String> = req.keys.into_iter().collect::<BTreeSet<_>>().into_iter().collect();

    let mut cache = state.cache.write().await;
    let found = cache.mget(&keys);

    let values: BTreeMap<String, Option<Value>> = keys.into_iter().zip(found).collect();
    Ok(Json(MgetResponse { values }))
}

/// Handler for DELETE /del/:key
///
/// Idempotent: deleting an absent key still answers 200 with `deleted: false`.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    let mut cache = state.cache.write().await;
    let deleted = cache.delete(&key);

    Json(DeleteResponse::new(key, deleted))
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.write().await.clear();
    Json(ClearResponse::new())
}

/// Handler for GET /stats
///
/// Returns the counters of the current alert window.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await;
    Json(StatsResponse::from(cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
