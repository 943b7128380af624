//! Eviction Policy Module
//!
//! Periodic sweep that drops expired entries and trims the store back to
//! capacity in least-recently-used order.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::config::CacheConfig;

/// Lower bound of the adaptive interval, as a fraction of the base interval.
const MIN_INTERVAL_FRACTION: f64 = 0.1;

// == Sweep Report ==
/// Outcome of a single sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries removed because their TTL elapsed
    pub expired: usize,
    /// Entries removed to get back under capacity
    pub trimmed: usize,
}

impl SweepReport {
    /// Total number of entries removed.
    pub fn removed(&self) -> usize {
        self.expired + self.trimmed
    }
}

// == Eviction Policy ==
#[derive(Debug, Clone)]
pub struct EvictionPolicy {
    base_interval: Duration,
    adaptive: bool,
}

impl EvictionPolicy {
    pub fn new(base_interval: Duration, adaptive: bool) -> Self {
        Self {
            base_interval,
            adaptive,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.evict_interval(), config.adaptive_evict_interval)
    }

    // == Sweep ==
    /// Runs one sweep over the store.
    ///
    /// Every entry expired at the store's current time is removed, then the
    /// next victims of the eviction order are evicted while the store is over
    /// capacity. A victim that cannot be removed is logged and skipped.
    pub fn sweep<V>(&self, store: &mut CacheStore<V>) -> SweepReport {
        let now = store.now_ms();
        let mut report = SweepReport::default();

        for key in store.expired_keys(now) {
            match store.remove_entry(&key) {
                Some(_) => {
                    report.expired += 1;
                    debug!("Cleared expired key {}", key);
                }
                None => warn!("Expired key {} vanished before it could be removed", key),
            }
        }

        while store.len() > store.capacity() {
            match store.evict_one() {
                Some(key) => {
                    report.trimmed += 1;
                    debug!("Trimmed key {} to restore capacity", key);
                }
                None => {
                    warn!(
                        "Store holds {} entries over a capacity of {} but has no eviction candidate",
                        store.len(),
                        store.capacity()
                    );
                    break;
                }
            }
        }

        store.record_evictions(report.removed() as u64);
        report
    }

    // == Next Interval ==
    /// Delay before the next sweep.
    ///
    /// With adaptive scheduling the base interval shrinks as the store fills,
    /// down to a tenth of the base interval.
    pub fn next_interval(&self, fill_ratio: f64) -> Duration {
        if !self.adaptive {
            return self.base_interval;
        }

        let factor = (1.0 - fill_ratio).clamp(MIN_INTERVAL_FRACTION, 1.0);
        self.base_interval.mul_f64(factor)
    }

    /// Runs a sweep and logs its outcome, returning the delay until the next one.
    pub fn run<V>(&self, store: &mut CacheStore<V>) -> Duration {
        let report = self.sweep(store);

        if report.removed() > 0 {
            info!(
                expired = report.expired,
                trimmed = report.trimmed,
                "Eviction sweep removed {} entries",
                report.removed()
            );
        } else {
            debug!("Eviction sweep: nothing to remove");
        }

        self.next_interval(store.fill_ratio())
    }
}
