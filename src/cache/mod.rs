//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, LRU or LFU eviction, early
//! expiration on read and hit-ratio alerting.

mod alerts;
mod clock;
mod early_expiration;
mod entry;
mod events;
mod eviction;
mod index;
mod stats;
mod store;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use alerts::{AlertMonitor, AlertSink, CacheAlert, TracingAlertSink};
pub use clock::{current_timestamp_ms, Clock, MockClock, SystemClock};
pub use early_expiration::EarlyExpirationGuard;
pub use entry::CacheEntry;
pub use events::CacheEvent;
pub use eviction::{EvictionPolicy, SweepReport};
pub use index::EvictionIndex;
pub use stats::CacheStats;
pub use store::CacheStore;

/// A cache store shared between request handlers and background tasks.
pub type SharedCache<V> = Arc<RwLock<CacheStore<V>>>;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed serialized value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
