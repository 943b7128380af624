//! Alert Task
//!
//! Background task that closes an alert window on every interval.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cache::{AlertMonitor, SharedCache};

/// Spawns a background task that evaluates and resets the cache counters
/// every `interval`.
pub fn spawn_alert_task<V>(
    cache: SharedCache<V>,
    monitor: AlertMonitor,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!("Starting alert monitor with window of {:?}", interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            let mut cache_guard = cache.write().await;
            monitor.close_window(&mut *cache_guard);
        }

        info!("Alert monitor stopped");
    })
}
