//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// All timestamps are Unix milliseconds taken from the store's clock.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// Key the entry is stored under
    pub key: String,
    /// The stored value
    pub value: V,
    /// Creation timestamp
    pub created_at: u64,
    /// Expiration timestamp, always `created_at + ttl_ms`
    pub expires_at: u64,
    /// Timestamp of the last successful read (or the write that created it)
    pub last_accessed_at: u64,
    /// TTL the entry was created with
    pub ttl_ms: u64,
    /// Monotonic access sequence, breaks ties between equal timestamps
    pub access_seq: u64,
    /// Number of writes and successful reads, starting at 1
    pub frequency: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `key` - The key the entry will be stored under
    /// * `value` - The value to store
    /// * `ttl_ms` - TTL in milliseconds, must be non-zero
    /// * `now` - Current timestamp in milliseconds
    /// * `access_seq` - Sequence number breaking eviction-order ties
    pub fn new(key: String, value: V, ttl_ms: u64, now: u64, access_seq: u64) -> Self {
        Self {
            key,
            value,
            created_at: now,
            expires_at: now.saturating_add(ttl_ms),
            last_accessed_at: now,
            ttl_ms,
            access_seq,
            frequency: 1,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is expired once `expires_at <= now`, so it stops being served
    /// the instant its TTL has fully elapsed.
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at <= now
    }

    // == Time To Live ==
    /// Returns remaining lifetime in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }

    // == Touch ==
    /// Records a successful read.
    pub fn touch(&mut self, now: u64, access_seq: u64) {
        self.last_accessed_at = now;
        self.access_seq = access_seq;
        self.frequency = self.frequency.saturating_add(1);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("k".to_string(), "test_value", 60_000, 1_000, 0);

        assert_eq!(entry.value, "test_value");
        assert_eq!(entry.created_at, 1_000);
        assert_eq!(entry.last_accessed_at, 1_000);
        assert_eq!(entry.expires_at, 61_000);
        assert_eq!(entry.frequency, 1);
        assert!(!entry.is_expired(1_000));
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new("k".to_string(), 1u32, 1_000, 0, 0);

        assert!(!entry.is_expired(999));
        assert!(entry.is_expired(1_001));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new("k".to_string(), 1u32, 500, 0, 0);

        // Entry should be expired when now == expires_at
        assert!(entry.is_expired(500), "Entry should be expired at boundary");
    }

    #[test]
    fn test_ttl_remaining_ms() {
        let entry = CacheEntry::new("k".to_string(), (), 10_000, 0, 0);

        assert_eq!(entry.ttl_remaining_ms(0), 10_000);
        assert_eq!(entry.ttl_remaining_ms(2_500), 7_500);
        assert_eq!(entry.ttl_remaining_ms(20_000), 0);
    }

    #[test]
    fn test_touch_updates_access_metadata_only() {
        let mut entry = CacheEntry::new("k".to_string(), (), 10_000, 0, 3);
        entry.touch(4_000, 9);

        assert_eq!(entry.last_accessed_at, 4_000);
        assert_eq!(entry.access_seq, 9);
        assert_eq!(entry.frequency, 2);
        assert_eq!(entry.created_at, 0);
        assert_eq!(entry.expires_at, 10_000);
    }
}
