//! Eviction Task
//!
//! Background task that periodically sweeps expired and excess cache entries.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cache::{EvictionPolicy, SharedCache};

/// Spawns a background task that runs an eviction sweep on every interval.
///
/// Each sweep holds the store's write lock for its whole duration, so it is
/// atomic with respect to request handlers. The task stops at the next
/// await point once `cancel` is triggered; it never stops mid-sweep.
///
/// # Example
/// ```ignore
/// let token = CancellationToken::new();
/// let handle = spawn_eviction_task(cache.clone(), policy, token.clone());
/// // Later, during shutdown:
/// token.cancel();
/// handle.await?;
/// ```
pub fn spawn_eviction_task<V>(
    cache: SharedCache<V>,
    policy: EvictionPolicy,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut interval = policy.next_interval(0.0);
        info!("Starting eviction task with interval of {:?}", interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            interval = {
                let mut cache_guard = cache.write().await;
                policy.run(&mut *cache_guard)
            };
        }

        info!("Eviction task stopped");
    })
}
