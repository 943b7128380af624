//! Early Expiration Module
//!
//! Probabilistically treats entries close to their expiry as already expired,
//! so concurrent readers do not all recompute a hot value at the same instant.

use rand::Rng;

use crate::cache::CacheEntry;
use crate::config::CacheConfig;

// == Early Expiration Guard ==
/// Decides whether a read of a near-expiry entry is forced to miss.
///
/// Inside the last `window` fraction of an entry's TTL the forced-miss
/// probability rises linearly from 0 at window entry to `probability` at the
/// true expiry. Outside the window it is always 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarlyExpirationGuard {
    probability: f64,
    window: f64,
}

impl EarlyExpirationGuard {
    /// Creates a guard with the given maximum probability and window fraction.
    pub fn new(probability: f64, window: f64) -> Self {
        Self {
            probability,
            window,
        }
    }

    /// Creates a guard from cache configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            config.early_expiration_probability,
            config.early_expiration_window,
        )
    }

    /// A guard that never forces a miss.
    pub fn disabled() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Returns true if the guard can ever force a miss.
    pub fn is_enabled(&self) -> bool {
        self.probability > 0.0 && self.window > 0.0
    }

    // == Probability ==
    /// Forced-miss probability for an entry with `ttl_ms` and `remaining_ms` left.
    pub fn forced_miss_probability(&self, ttl_ms: u64, remaining_ms: u64) -> f64 {
        if !self.is_enabled() {
            return 0.0;
        }

        let window_ms = ttl_ms as f64 * self.window;
        let remaining = remaining_ms as f64;
        if remaining > window_ms {
            return 0.0;
        }

        self.probability * (1.0 - remaining / window_ms)
    }

    // == Should Expire Early ==
    /// Applies the decision for a given uniform draw `r` in `[0, 1)`.
    pub fn should_expire_early_with(&self, ttl_ms: u64, remaining_ms: u64, r: f64) -> bool {
        r < self.forced_miss_probability(ttl_ms, remaining_ms)
    }

    /// Draws from `rng` and decides whether the read of `entry` at `now` is
    /// forced to miss. Entries outside the window consume no randomness.
    pub fn should_expire_early<V, R: Rng + ?Sized>(
        &self,
        entry: &CacheEntry<V>,
        now: u64,
        rng: &mut R,
    ) -> bool {
        let probability = self.forced_miss_probability(entry.ttl_ms, entry.ttl_remaining_ms(now));
        if probability <= 0.0 {
            return false;
        }
        rng.gen::<f64>() < probability
    }
}

impl Default for EarlyExpirationGuard {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
