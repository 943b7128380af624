//! Error types for the cache engine and server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Config Error ==
/// Rejected cache configuration. The store refuses to start with any of these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("max_cache_size must be greater than zero")]
    InvalidMaxCacheSize,

    #[error("default_ttl_ms must be greater than zero")]
    InvalidDefaultTtl,

    #[error("{0} must be greater than zero")]
    InvalidInterval(&'static str),

    #[error("{field} must be within [0, 1], got {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("unknown eviction policy {0:?}, expected \"lru\" or \"lfu\"")]
    UnknownEvictionPolicy(String),
}

// == Alert Error ==
/// Failure of an alert sink to deliver an alert.
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Alert sink unavailable: {0}")]
    SinkUnavailable(String),
}

// == Cache Error Enum ==
/// Error type surfaced by the HTTP layer.
///
/// Store operations themselves never fail; a miss is reported as `NotFound`
/// only at the API boundary.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache (absent, expired or early-expired)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP handlers.
pub type Result<T> = std::result::Result<T, CacheError>;
