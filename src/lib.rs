//! Syrup Cache - an in-memory TTL cache engine with an HTTP front end
//!
//! Bounded LRU/LFU storage, probabilistic early expiration, periodic eviction
//! sweeps and hit-ratio/eviction alerts.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use config::{CacheConfig, Config};
pub use tasks::CacheTasks;
