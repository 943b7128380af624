//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the cache.
//!
//! # Tasks
//! - Eviction: sweeps expired and excess entries every eviction interval
//! - Alerts: closes the counter window and reports threshold breaches

mod alerts;
mod eviction;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cache::{AlertMonitor, EvictionPolicy, SharedCache};
use crate::config::CacheConfig;

pub use alerts::spawn_alert_task;
pub use eviction::spawn_eviction_task;

// == Cache Tasks ==
/// Owns the cache's background tasks and stops them together.
#[derive(Debug)]
pub struct CacheTasks {
    cancel: CancellationToken,
    eviction: JoinHandle<()>,
    alerts: JoinHandle<()>,
}

impl CacheTasks {
    /// Starts the eviction and alert tasks for `cache`, alerting through tracing.
    pub fn start<V>(cache: SharedCache<V>, config: &CacheConfig) -> Self
    where
        V: Send + Sync + 'static,
    {
        Self::start_with_monitor(cache, config, AlertMonitor::new(config.alerts.clone()))
    }

    /// Starts the tasks with a caller-provided alert monitor.
    pub fn start_with_monitor<V>(
        cache: SharedCache<V>,
        config: &CacheConfig,
        monitor: AlertMonitor,
    ) -> Self
    where
        V: Send + Sync + 'static,
    {
        let cancel = CancellationToken::new();
        let eviction = spawn_eviction_task(
            cache.clone(),
            EvictionPolicy::from_config(config),
            cancel.child_token(),
        );
        let alerts = spawn_alert_task(cache, monitor, config.alert_interval(), cancel.child_token());

        Self {
            cancel,
            eviction,
            alerts,
        }
    }

    /// Returns true once both tasks have exited.
    pub fn is_finished(&self) -> bool {
        self.eviction.is_finished() && self.alerts.is_finished()
    }

    /// Cancels both tasks and waits for them to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();

        for (name, handle) in [("eviction", self.eviction), ("alerts", self.alerts)] {
            if let Err(e) = handle.await {
                warn!("Background {} task ended abnormally: {}", name, e);
            }
        }

        info!("Cache background tasks stopped");
    }
}
