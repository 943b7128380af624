//! Eviction Index Module
//!
//! Orders cache keys by eviction priority, either least recently used or
//! least frequently used.

use std::collections::BTreeSet;

use crate::cache::CacheEntry;
use crate::config::EvictionStrategy;

/// Position of a key in the eviction order.
///
/// Under LRU the first component is always 0, so entries compare by last
/// access, then creation time, then access sequence. Under LFU the first
/// component is the read/write frequency and recency only breaks ties.
type Rank = (u64, u64, u64, u64);

// == Eviction Index ==
/// Tracks entries in the order they should be evicted.
///
/// The first element of the set is the next victim. The store removes a
/// key's old rank before inserting its new one.
#[derive(Debug)]
pub struct EvictionIndex {
    strategy: EvictionStrategy,
    order: BTreeSet<(Rank, String)>,
}

impl EvictionIndex {
    pub fn new(strategy: EvictionStrategy) -> Self {
        Self {
            strategy,
            order: BTreeSet::new(),
        }
    }

    pub fn strategy(&self) -> EvictionStrategy {
        self.strategy
    }

    /// Ordering position of an entry under this index's strategy.
    pub fn rank_of<V>(&self, entry: &CacheEntry<V>) -> Rank {
        let frequency = match self.strategy {
            EvictionStrategy::Lru => 0,
            EvictionStrategy::Lfu => entry.frequency,
        };
        (
            frequency,
            entry.last_accessed_at,
            entry.created_at,
            entry.access_seq,
        )
    }

    // == Insert ==
    /// Adds an entry at its current rank.
    pub fn insert<V>(&mut self, entry: &CacheEntry<V>) {
        self.order.insert((self.rank_of(entry), entry.key.clone()));
    }

    // == Remove ==
    /// Removes an entry at its current rank. Returns false if it was not indexed.
    pub fn remove<V>(&mut self, entry: &CacheEntry<V>) -> bool {
        self.order.remove(&(self.rank_of(entry), entry.key.clone()))
    }

    /// Returns the next eviction victim without removing it.
    pub fn peek_victim(&self) -> Option<&str> {
        self.order.first().map(|(_, key)| key.as_str())
    }

    /// Returns and removes the next eviction victim.
    pub fn pop_victim(&mut self) -> Option<String> {
        self.order.pop_first().map(|(_, key)| key)
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
