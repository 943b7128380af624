//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with an eviction index, TTL
//! expiration and early expiration on read.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::cache::{
    CacheEntry, CacheEvent, CacheStats, Clock, EarlyExpirationGuard, EvictionIndex, SystemClock,
};
use crate::config::CacheConfig;
use crate::error::ConfigError;

// == Cache Store ==
/// Bounded key/value store with LRU or LFU eviction and TTL support.
///
/// Values are cloned in on `set` and out on `get`, so callers never hold a
/// reference into cached state. Store operations never fail: a missing,
/// expired or early-expired key is a plain `None`.
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Eviction order
    index: EvictionIndex,
    /// Window counters
    stats: CacheStats,
    config: CacheConfig,
    guard: EarlyExpirationGuard,
    clock: Arc<dyn Clock>,
    rng: StdRng,
    /// Last issued access sequence number
    seq: u64,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore backed by the system clock.
    ///
    /// Fails if the configuration is invalid.
    pub fn new(config: CacheConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a new CacheStore reading time from `clock`.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            entries: HashMap::with_capacity(config.max_cache_size),
            index: EvictionIndex::new(config.eviction_policy),
            stats: CacheStats::new(),
            guard: EarlyExpirationGuard::from_config(&config),
            config,
            clock,
            rng: StdRng::from_entropy(),
            seq: 0,
        })
    }

    /// Reseeds the early expiration random source, for reproducible runs.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL in milliseconds.
    ///
    /// If the key already exists, the value is overwritten, its TTL and
    /// timestamps are reset and the write counts towards its frequency. If
    /// the cache is at capacity and the key is new, the next victim of the
    /// eviction order is evicted first. A TTL of `None` or 0
    /// uses the configured default.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<u64>) {
        let key = key.into();
        let now = self.clock.now_ms();
        let ttl_ms = ttl
            .filter(|ttl| *ttl > 0)
            .unwrap_or(self.config.default_ttl_ms);

        let mut frequency = 1;
        if let Some(previous) = self.entries.get(&key) {
            self.index.remove(previous);
            frequency = previous.frequency.saturating_add(1);
        } else {
            while self.entries.len() >= self.config.max_cache_size {
                match self.evict_one() {
                    Some(evicted) => {
                        self.stats.record_eviction();
                        debug!("Evicted {} to make room for {}", evicted, key);
                    }
                    None => break,
                }
            }
        }

        let seq = self.next_seq();
        let mut entry = CacheEntry::new(key.clone(), value, ttl_ms, now, seq);
        entry.frequency = frequency;
        self.index.insert(&entry);
        self.entries.insert(key.clone(), entry);
        self.stats.set_total_entries(self.entries.len());

        debug!("{}", CacheEvent::Update(&key));
    }

    // == Get ==
    /// Retrieves a value by key and marks it as recently used.
    ///
    /// Returns `None` if the key is absent, expired, or selected for early
    /// expiration. Expired entries are removed and counted as evictions;
    /// early-expired entries are left in place untouched.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();

        let (expired, expire_early) = match self.entries.get(key) {
            Some(entry) if entry.is_expired(now) => (true, false),
            Some(entry) => (
                false,
                self.guard.should_expire_early(entry, now, &mut self.rng),
            ),
            None => return self.miss(key),
        };

        if expired {
            if self.remove_entry(key).is_some() {
                self.stats.record_eviction();
            }
            return self.miss(key);
        }

        if expire_early {
            debug!("Early expiration forced a miss for key {}", key);
            return self.miss(key);
        }

        let seq = self.next_seq();
        let entry = self.entries.get_mut(key)?;
        self.index.remove(entry);
        entry.touch(now, seq);
        self.index.insert(entry);
        let value = entry.value.clone();

        self.stats.record_hit();
        debug!("{}", CacheEvent::Hit(key));
        Some(value)
    }

    // == Peek ==
    /// Returns a live value without touching recency, counters or the
    /// early expiration guard.
    pub fn peek(&self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone())
    }

    // == Batch Operations ==
    /// Gets several keys; each lookup counts as its own hit or miss.
    pub fn mget<S: AsRef<str>>(&mut self, keys: &[S]) -> Vec<Option<V>> {
        keys.iter().map(|key| self.get(key.as_ref())).collect()
    }

    /// Sets several pairs with the same TTL.
    pub fn mset<K, I>(&mut self, entries: I, ttl: Option<u64>)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in entries {
            self.set(key, value, ttl);
        }
    }

    /// Deletes several keys, returning how many were present.
    pub fn mdel<S: AsRef<str>>(&mut self, keys: &[S]) -> usize {
        keys.iter().filter(|&key| self.delete(key.as_ref())).count()
    }
}

impl<V> CacheStore<V> {
    // == Delete ==
    /// Removes an entry by key. Idempotent; returns whether a value was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.remove_entry(key).is_some() {
            debug!("{}", CacheEvent::Delete(key));
            true
        } else {
            debug!("Nothing to delete for key {}", key);
            false
        }
    }

    // == Clear ==
    /// Removes all entries. Counters are left alone.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.stats.set_total_entries(0);
        info!("Cache cleared.");
    }

    /// Returns true if `key` holds a value that has not expired.
    pub fn contains_key(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Remaining lifetime of a live entry in milliseconds.
    pub fn ttl_remaining(&self, key: &str) -> Option<u64> {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.ttl_remaining_ms(now))
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Returns the closing window's statistics and starts a new window.
    pub fn take_window_stats(&mut self) -> CacheStats {
        self.stats.set_total_entries(self.entries.len());
        self.stats.reset_window()
    }

    // == Length ==
    /// Returns the current number of entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.config.max_cache_size
    }

    /// Share of capacity in use, in `[0, 1]` under normal operation.
    pub fn fill_ratio(&self) -> f64 {
        self.entries.len() as f64 / self.config.max_cache_size as f64
    }

    /// Current time as seen by the store.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    // == Sweep Support ==
    /// Keys of all entries expired at `now`.
    pub(crate) fn expired_keys(&self, now: u64) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Removes an entry from storage and the recency index.
    pub(crate) fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        if !self.index.remove(&entry) {
            warn!("Eviction index had no slot for removed key {}", key);
        }
        self.stats.set_total_entries(self.entries.len());
        Some(entry)
    }

    /// Evicts the next victim of the eviction order, returning its key.
    ///
    /// Index slots whose key is no longer stored are dropped and skipped.
    pub(crate) fn evict_one(&mut self) -> Option<String> {
        while let Some(key) = self.index.pop_victim() {
            if self.entries.remove(&key).is_some() {
                self.stats.set_total_entries(self.entries.len());
                return Some(key);
            }
            warn!("Skipping stale eviction slot for key {}", key);
        }
        None
    }

    /// Inserts an entry without the capacity check, to simulate a writer
    /// that bypassed it.
    #[cfg(test)]
    pub(crate) fn insert_unchecked(&mut self, entry: CacheEntry<V>) {
        self.index.insert(&entry);
        self.entries.insert(entry.key.clone(), entry);
    }

    pub(crate) fn record_evictions(&mut self, count: u64) {
        self.stats.record_evictions(count);
    }

    fn miss<T>(&mut self, key: &str) -> Option<T> {
        self.stats.record_miss();
        debug!("{}", CacheEvent::Miss(key));
        None
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }
}

impl<V> fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("len", &self.entries.len())
            .field("stats", &self.stats)
            .field("config", &self.config)
            .field("guard", &self.guard)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MockClock;
    use crate::config::EvictionStrategy;

    fn config(max_cache_size: usize, default_ttl_ms: u64) -> CacheConfig {
        CacheConfig {
            max_cache_size,
            default_ttl_ms,
            early_expiration_probability: 0.0,
            ..CacheConfig::default()
        }
    }

    fn store_with_clock<V: Clone>(config: CacheConfig) -> (CacheStore<V>, MockClock) {
        let clock = MockClock::default();
        let store = CacheStore::with_clock(config, Arc::new(clock.clone()))
            .unwrap()
            .with_rng_seed(42);
        (store, clock)
    }

    #[test]
    fn test_store_new() {
        let store: CacheStore<String> = CacheStore::new(CacheConfig::default()).unwrap();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 200);
    }

    #[test]
    fn test_store_rejects_invalid_config() {
        let result: Result<CacheStore<String>, _> = CacheStore::new(config(0, 1_000));
        assert!(matches!(result, Err(ConfigError::InvalidMaxCacheSize)));
    }

    #[test]
    fn test_store_set_and_get() {
        let (mut store, _) = store_with_clock(config(100, 30_000));

        store.set("key1", "value1".to_string(), None);

        assert_eq!(store.get("key1"), Some("value1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let (mut store, _) = store_with_clock::<String>(config(100, 30_000));

        assert_eq!(store.get("nonexistent"), None);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_delete_is_idempotent() {
        let (mut store, _) = store_with_clock(config(100, 30_000));

        store.set("key1", "value1".to_string(), None);
        assert!(store.delete("key1"));
        assert!(!store.delete("key1"));
        assert!(!store.delete("never_set"));

        assert!(store.is_empty());
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_store_overwrite() {
        let (mut store, clock) = store_with_clock(config(100, 1_000));

        store.set("key1", "value1".to_string(), None);
        clock.advance_ms(900);
        store.set("key1", "value2".to_string(), None);
        clock.advance_ms(900);

        // Overwrite reset the TTL
        assert_eq!(store.get("key1"), Some("value2".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_capacity_scenario() {
        let (mut store, _) = store_with_clock(config(2, 30_000));

        store.set("a", "1".to_string(), None);
        store.set("b", "2".to_string(), None);
        store.set("c", "3".to_string(), None);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("b"), Some("2".to_string()));
        assert_eq!(store.get("c"), Some("3".to_string()));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_expires_without_sweep() {
        let (mut store, clock) = store_with_clock(config(100, 1_000));

        store.set("k", "v".to_string(), None);
        clock.advance_ms(1_001);

        assert_eq!(store.get("k"), None);
        assert!(store.is_empty(), "expired entry is dropped on read");
    }

    #[test]
    fn test_store_explicit_ttl_and_zero_ttl() {
        let (mut store, clock) = store_with_clock(config(100, 10_000));

        store.set("short", "v".to_string(), Some(100));
        store.set("zero", "v".to_string(), Some(0));
        clock.advance_ms(150);

        assert_eq!(store.get("short"), None);
        assert_eq!(store.get("zero"), Some("v".to_string()));
        assert_eq!(store.ttl_remaining("zero"), Some(9_850));
    }

    fn lfu_config(max_cache_size: usize) -> CacheConfig {
        CacheConfig {
            eviction_policy: EvictionStrategy::Lfu,
            ..config(max_cache_size, 30_000)
        }
    }

    #[test]
    fn test_store_overwrite_counts_towards_frequency() {
        let (mut store, _) = store_with_clock(config(10, 30_000));

        store.set("k", 1u32, None);
        assert_eq!(store.entries["k"].frequency, 1);
        store.set("k", 2u32, None);
        store.get("k").unwrap();
        assert_eq!(store.entries["k"].frequency, 3);
    }

    #[test]
    fn test_store_lfu_evicts_least_frequent() {
        let (mut store, clock) = store_with_clock(lfu_config(2));

        store.set("a", "1".to_string(), None);
        store.set("b", "2".to_string(), None);
        clock.advance_ms(10);
        store.get("a").unwrap();
        store.get("a").unwrap();
        clock.advance_ms(10);
        // b is now the most recent but still the least frequent
        store.get("b").unwrap();

        store.set("c", "3".to_string(), None);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("b"), None);
        assert_eq!(store.get("a"), Some("1".to_string()));
        assert_eq!(store.get("c"), Some("3".to_string()));
    }

    #[test]
    fn test_store_lfu_ties_fall_back_to_recency() {
        let (mut store, clock) = store_with_clock(lfu_config(2));

        store.set("a", 1u32, None);
        clock.advance_ms(1);
        store.set("b", 2u32, None);
        clock.advance_ms(1);
        store.set("c", 3u32, None);

        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("b"), Some(2));
    }

    #[test]
    fn test_store_lfu_overwrite_protects_key() {
        let (mut store, clock) = store_with_clock(lfu_config(2));

        store.set("a", 1u32, None);
        store.set("a", 10u32, None);
        clock.advance_ms(1);
        store.set("b", 2u32, None);
        clock.advance_ms(1);
        store.set("c", 3u32, None);

        assert_eq!(store.get("b"), None);
        assert_eq!(store.get("a"), Some(10));
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let (mut store, clock) = store_with_clock(config(3, 30_000));

        store.set("key1", "value1".to_string(), None);
        store.set("key2", "value2".to_string(), None);
        store.set("key3", "value3".to_string(), None);

        clock.advance_ms(10);
        store.get("key1").unwrap();

        // key2 is now the least recently used
        store.set("key4", "value4".to_string(), None);

        assert!(store.get("key1").is_some());
        assert_eq!(store.get("key2"), None);
    }

    #[test]
    fn test_store_lru_tie_breaks_on_created_at() {
        let (mut store, clock) = store_with_clock(config(2, 30_000));

        store.set("older", "1".to_string(), None);
        clock.advance_ms(5);
        store.set("newer", "2".to_string(), None);
        clock.advance_ms(5);

        // Both read in the same millisecond, newer first
        store.get("newer").unwrap();
        store.get("older").unwrap();

        store.set("third", "3".to_string(), None);

        assert!(!store.contains_key("older"));
        assert!(store.contains_key("newer"));
    }

    #[test]
    fn test_store_early_expiration_forces_miss_without_removal() {
        let config = CacheConfig {
            max_cache_size: 10,
            default_ttl_ms: 10_000,
            early_expiration_probability: 1.0,
            early_expiration_window: 0.5,
            ..CacheConfig::default()
        };
        let (mut store, clock) = store_with_clock(config);

        store.set("hot", "v".to_string(), None);
        // 1ms left of a 5s window, forced-miss probability ~1
        clock.advance_ms(9_999);

        let misses = (0..20).filter(|_| store.get("hot").is_none()).count();
        assert!(misses >= 19);
        assert_eq!(store.len(), 1, "forced misses keep the entry");
        assert_eq!(store.peek("hot"), Some("v".to_string()));
    }

    #[test]
    fn test_store_peek_does_not_count() {
        let (mut store, clock) = store_with_clock(config(10, 1_000));

        store.set("k", "v".to_string(), None);
        assert_eq!(store.peek("k"), Some("v".to_string()));
        assert_eq!(store.peek("missing"), None);

        let stats = store.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);

        clock.advance_ms(1_000);
        assert_eq!(store.peek("k"), None);
        assert!(!store.contains_key("k"));
    }

    #[test]
    fn test_store_batch_operations() {
        let (mut store, _) = store_with_clock(config(10, 30_000));

        store.mset(vec![("a", "1".to_string()), ("b", "2".to_string())], None);
        let values = store.mget(&["a", "b", "c"]);
        assert_eq!(
            values,
            vec![Some("1".to_string()), Some("2".to_string()), None]
        );

        assert_eq!(store.mdel(&["a", "c"]), 1);
        assert_eq!(store.len(), 1);

        let stats = store.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_store_clear() {
        let (mut store, _) = store_with_clock(config(10, 30_000));

        store.set("a", "1".to_string(), None);
        store.set("b", "2".to_string(), None);
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.stats().total_entries, 0);

        // Index was cleared too, so refilling does not evict
        store.set("c", "3".to_string(), None);
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_value_is_copied_out() {
        let (mut store, _) = store_with_clock(config(10, 30_000));
        store.set("list", vec![1, 2, 3], None);

        let mut copy: Vec<i32> = store.get("list").unwrap();
        copy.push(4);

        assert_eq!(store.get("list"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_store_take_window_stats() {
        let (mut store, _) = store_with_clock(config(10, 30_000));

        store.set("k", "v".to_string(), None);
        store.get("k");
        store.get("missing");

        let window = store.take_window_stats();
        assert_eq!(window.hits, 1);
        assert_eq!(window.misses, 1);
        assert_eq!(window.total_entries, 1);

        let stats = store.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.total_entries, 1);
    }
}
