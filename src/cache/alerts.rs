//! Alert Monitor Module
//!
//! Evaluates the hit ratio and eviction count of each window against the
//! configured thresholds and hands breaches to an alert sink.

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::cache::{CacheStats, CacheStore};
use crate::config::AlertConfig;
use crate::error::AlertError;

// == Cache Alert ==
/// A threshold breach detected at the end of a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CacheAlert {
    LowHitRatio { hit_ratio: f64, min_hit_ratio: f64 },
    ExcessiveEvictions { evictions: u64, max_evictions: u64 },
}

impl std::fmt::Display for CacheAlert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheAlert::LowHitRatio {
                hit_ratio,
                min_hit_ratio,
            } => write!(
                f,
                "Cache hit ratio dropped below {:.0}%: {:.3}",
                min_hit_ratio * 100.0,
                hit_ratio
            ),
            CacheAlert::ExcessiveEvictions {
                evictions,
                max_evictions,
            } => write!(f, "Cache evictions exceeded {}: {}", max_evictions, evictions),
        }
    }
}

// == Alert Sink ==
/// Destination for alerts, typically an observability backend.
pub trait AlertSink: Send + Sync {
    fn emit(&self, alert: &CacheAlert) -> Result<(), AlertError>;
}

/// Sink that writes alerts as structured error-level log records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn emit(&self, alert: &CacheAlert) -> Result<(), AlertError> {
        let payload = serde_json::to_string(alert)
            .map_err(|e| AlertError::SinkUnavailable(e.to_string()))?;
        error!(alert = %payload, "{}", alert);
        Ok(())
    }
}

// == Alert Monitor ==
pub struct AlertMonitor {
    thresholds: AlertConfig,
    sink: Box<dyn AlertSink>,
}

impl AlertMonitor {
    /// Creates a monitor that logs alerts through `tracing`.
    pub fn new(thresholds: AlertConfig) -> Self {
        Self::with_sink(thresholds, Box::new(TracingAlertSink))
    }

    pub fn with_sink(thresholds: AlertConfig, sink: Box<dyn AlertSink>) -> Self {
        Self { thresholds, sink }
    }

    // == Evaluate ==
    /// Alerts raised by a closed window's counters.
    ///
    /// The hit ratio check is skipped for a window without reads.
    pub fn evaluate(&self, window: &CacheStats) -> Vec<CacheAlert> {
        let mut alerts = Vec::new();

        if let Some(hit_ratio) = window.hit_ratio() {
            if hit_ratio < self.thresholds.min_hit_ratio {
                alerts.push(CacheAlert::LowHitRatio {
                    hit_ratio,
                    min_hit_ratio: self.thresholds.min_hit_ratio,
                });
            }
        }

        if window.evictions > self.thresholds.max_evictions {
            alerts.push(CacheAlert::ExcessiveEvictions {
                evictions: window.evictions,
                max_evictions: self.thresholds.max_evictions,
            });
        }

        alerts
    }

    // == Close Window ==
    /// Closes the store's current window, evaluates it and emits any alerts.
    ///
    /// Sink failures are logged and dropped; they never reach the cache.
    pub fn close_window<V>(&self, store: &mut CacheStore<V>) -> Vec<CacheAlert> {
        let window = store.take_window_stats();
        let alerts = self.evaluate(&window);

        debug!(
            hits = window.hits,
            misses = window.misses,
            evictions = window.evictions,
            "Alert window closed with {} alert(s)",
            alerts.len()
        );

        for alert in &alerts {
            if let Err(e) = self.sink.emit(alert) {
                warn!("Failed to emit cache alert ({}): {}", alert, e);
            }
        }

        alerts
    }
}

impl std::fmt::Debug for AlertMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertMonitor")
            .field("thresholds", &self.thresholds)
            .finish_non_exhaustive()
    }
}
