//! Configuration Module
//!
//! Handles loading and validating cache and server configuration from
//! environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;

// == Defaults ==
/// Default TTL in milliseconds applied when `set` omits one
pub const DEFAULT_TTL_MS: u64 = 30_000;
/// Default hard cap on the number of entries
pub const DEFAULT_MAX_CACHE_SIZE: usize = 200;
/// Default period between eviction sweeps in milliseconds
pub const DEFAULT_EVICT_INTERVAL_MS: u64 = 30_000;
/// Default maximum forced-miss probability at true expiry
pub const DEFAULT_EARLY_EXPIRATION_PROBABILITY: f64 = 0.5;
/// Default fraction of the TTL treated as "near expiry"
pub const DEFAULT_EARLY_EXPIRATION_WINDOW: f64 = 0.2;
/// Default hit ratio below which an alert is raised
pub const DEFAULT_MIN_HIT_RATIO: f64 = 0.8;
/// Default number of evictions per window above which an alert is raised
pub const DEFAULT_MAX_EVICTIONS: u64 = 100;
/// Default HTTP server port
pub const DEFAULT_SERVER_PORT: u16 = 3000;

// == Eviction Strategy ==
/// Order in which entries are evicted once the cache is over capacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvictionStrategy {
    /// Least recently used first
    #[default]
    Lru,
    /// Least frequently used first, least recently used among equals
    Lfu,
}

impl FromStr for EvictionStrategy {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(Self::Lru),
            "lfu" => Ok(Self::Lfu),
            _ => Err(ConfigError::UnknownEvictionPolicy(raw.to_string())),
        }
    }
}

// == Alert Config ==
/// Thresholds evaluated by the alert monitor at the end of every window.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertConfig {
    /// Hit ratio below which a low hit ratio alert fires
    pub min_hit_ratio: f64,
    /// Evictions per window above which an excessive eviction alert fires
    pub max_evictions: u64,
    /// Window length in milliseconds, None = same as the eviction interval
    pub interval_ms: Option<u64>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            min_hit_ratio: DEFAULT_MIN_HIT_RATIO,
            max_evictions: DEFAULT_MAX_EVICTIONS,
            interval_ms: None,
        }
    }
}

// == Cache Config ==
/// Immutable cache configuration injected into the store at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// TTL in milliseconds used when `set` is called without one
    pub default_ttl_ms: u64,
    /// Maximum number of entries the cache can hold
    pub max_cache_size: usize,
    /// Period between eviction sweeps in milliseconds
    pub evict_interval_ms: u64,
    /// Forced-miss probability reached at true expiry
    pub early_expiration_probability: f64,
    /// Fraction of an entry's TTL during which early expiration applies
    pub early_expiration_window: f64,
    /// Shorten the sweep interval as the cache fills up
    pub adaptive_evict_interval: bool,
    /// Victim selection when the cache is over capacity
    pub eviction_policy: EvictionStrategy,
    /// Alerting thresholds
    pub alerts: AlertConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_ms: DEFAULT_TTL_MS,
            max_cache_size: DEFAULT_MAX_CACHE_SIZE,
            evict_interval_ms: DEFAULT_EVICT_INTERVAL_MS,
            early_expiration_probability: DEFAULT_EARLY_EXPIRATION_PROBABILITY,
            early_expiration_window: DEFAULT_EARLY_EXPIRATION_WINDOW,
            adaptive_evict_interval: false,
            eviction_policy: EvictionStrategy::Lru,
            alerts: AlertConfig::default(),
        }
    }
}

impl CacheConfig {
    /// Loads cache configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 30000)
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 200)
    /// - `CACHE_EVICT_INTERVAL_MS` - Sweep period in milliseconds (default: 30000)
    /// - `CACHE_EARLY_EXPIRATION_PROBABILITY` - (default: 0.5)
    /// - `CACHE_EARLY_EXPIRATION_WINDOW` - (default: 0.2)
    /// - `CACHE_ADAPTIVE_EVICT_INTERVAL` - (default: false)
    /// - `CACHE_EVICTION_POLICY` - `lru` or `lfu` (default: lru)
    /// - `CACHE_MIN_HIT_RATIO` - (default: 0.8)
    /// - `CACHE_MAX_EVICTIONS` - (default: 100)
    /// - `CACHE_ALERT_INTERVAL_MS` - Alert window length (default: eviction interval)
    ///
    /// The result is not validated; call [`CacheConfig::validate`] before use.
    pub fn from_env() -> Self {
        Self {
            default_ttl_ms: env_or("CACHE_DEFAULT_TTL_MS", DEFAULT_TTL_MS),
            max_cache_size: env_or("CACHE_MAX_SIZE", DEFAULT_MAX_CACHE_SIZE),
            evict_interval_ms: env_or("CACHE_EVICT_INTERVAL_MS", DEFAULT_EVICT_INTERVAL_MS),
            early_expiration_probability: env_or(
                "CACHE_EARLY_EXPIRATION_PROBABILITY",
                DEFAULT_EARLY_EXPIRATION_PROBABILITY,
            ),
            early_expiration_window: env_or(
                "CACHE_EARLY_EXPIRATION_WINDOW",
                DEFAULT_EARLY_EXPIRATION_WINDOW,
            ),
            adaptive_evict_interval: env_or("CACHE_ADAPTIVE_EVICT_INTERVAL", false),
            eviction_policy: env_or("CACHE_EVICTION_POLICY", EvictionStrategy::Lru),
            alerts: AlertConfig {
                min_hit_ratio: env_or("CACHE_MIN_HIT_RATIO", DEFAULT_MIN_HIT_RATIO),
                max_evictions: env_or("CACHE_MAX_EVICTIONS", DEFAULT_MAX_EVICTIONS),
                interval_ms: env_opt("CACHE_ALERT_INTERVAL_MS"),
            },
        }
    }

    // == Validate ==
    /// Rejects configurations the store must not start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_cache_size == 0 {
            return Err(ConfigError::InvalidMaxCacheSize);
        }
        if self.default_ttl_ms == 0 {
            return Err(ConfigError::InvalidDefaultTtl);
        }
        if self.evict_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval("evict_interval_ms"));
        }
        if self.alerts.interval_ms == Some(0) {
            return Err(ConfigError::InvalidInterval("alerts.interval_ms"));
        }
        check_unit_range(
            "early_expiration_probability",
            self.early_expiration_probability,
        )?;
        check_unit_range("early_expiration_window", self.early_expiration_window)?;
        check_unit_range("alerts.min_hit_ratio", self.alerts.min_hit_ratio)?;
        Ok(())
    }

    /// Period between eviction sweeps.
    pub fn evict_interval(&self) -> Duration {
        Duration::from_millis(self.evict_interval_ms)
    }

    /// Length of an alert window.
    pub fn alert_interval(&self) -> Duration {
        Duration::from_millis(self.alerts.interval_ms.unwrap_or(self.evict_interval_ms))
    }
}

fn check_unit_range(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env_opt(name).unwrap_or(default)
}

/// Reads and parses an optional variable, warning when it is set but unparseable.
fn env_opt<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparseable value {:?} for {}", raw, name);
            None
        }
    }
}

// == Server Config ==
/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Cache engine configuration
    pub cache: CacheConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// `SERVER_PORT` selects the HTTP port (default: 3000); cache options are
    /// read by [`CacheConfig::from_env`].
    pub fn from_env() -> Self {
        Self {
            server_port: env_or("SERVER_PORT", DEFAULT_SERVER_PORT),
            cache: CacheConfig::from_env(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            cache: CacheConfig::default(),
        }
    }
}
