//! Cache Store Module
//!
//! TTL key/value store with lazy expiry and prefix invalidation.
//!
//! There is no capacity bound and no background sweep: an expired entry stays
//! in memory until a lookup targets its exact key or it is cleared. Callers
//! that cache many distinct keys should clear by prefix periodically.

use std::collections::HashMap;

use tracing::trace;

use crate::cache::{CacheEntry, CacheStats};

// == Cache Store ==
/// Keyed storage of values with per-entry expiry.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Performance statistics
    stats: CacheStats,
    /// TTL in seconds applied when `set` is given none
    default_ttl: u64,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store using `default_ttl` seconds for entries set
    /// without an explicit TTL.
    pub fn new(default_ttl: u64) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl,
        }
    }

    // == Set ==
    /// Stores a value, replacing any previous entry for the key.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - TTL in seconds (uses default_ttl if None)
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<u64>) {
        let key = key.into();
        let entry = CacheEntry::new(value, ttl.unwrap_or(self.default_ttl));
        trace!(key = %key, expires_at = %entry.expires_at, "cache set");
        self.entries.insert(key, entry);
    }

    // == Get ==
    /// Returns a clone of the value if present and not expired.
    ///
    /// An expired entry is removed on the spot and counted as a miss.
    pub fn get(&mut self, key: &str) -> Option<V> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            Some(_) => {
                self.entries.remove(key);
                trace!(key = %key, "cache entry expired");
                self.stats.record_miss();
                None
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Remove ==
    /// Deletes the entry for `key`, if any.
    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    // == Clear ==
    /// Deletes every entry whose key starts with `prefix`.
    ///
    /// Returns the number of entries removed.
    pub fn clear(&mut self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        before - self.entries.len()
    }

    /// Deletes every entry.
    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Default TTL in seconds.
    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if an entry exists for `key`, whether or not it has expired.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_store_new() {
        let store: CacheStore<String> = CacheStore::new(300);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.default_ttl(), 300);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = CacheStore::new(300);

        store.set("key1", "value1".to_string(), None);

        assert_eq!(store.get("key1").as_deref(), Some("value1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store: CacheStore<String> = CacheStore::new(300);
        assert!(store.get("nonexistent").is_none());
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = CacheStore::new(300);

        store.set("key1", "value1".to_string(), None);
        store.set("key1", "value2".to_string(), None);

        assert_eq!(store.get("key1").as_deref(), Some("value2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_zero_ttl_misses_immediately() {
        let mut store = CacheStore::new(300);

        store.set("key1", 7u32, Some(0));

        assert!(store.get("key1").is_none());
        assert!(!store.contains_key("key1"));
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = CacheStore::new(300);

        store.set("key1", "value1".to_string(), Some(1));
        assert!(store.get("key1").is_some());

        sleep(Duration::from_millis(1100));

        assert!(store.get("key1").is_none());
    }

    #[test]
    fn test_expired_entries_linger_until_read() {
        let mut store = CacheStore::new(300);

        store.set("stale", 1u8, Some(0));
        store.set("fresh", 2u8, None);

        assert_eq!(store.len(), 2);
        assert!(store.contains_key("stale"));

        assert!(store.get("stale").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_remove() {
        let mut store = CacheStore::new(300);

        store.set("key1", "value1".to_string(), None);
        store.remove("key1");
        store.remove("never-set");

        assert!(store.is_empty());
    }

    #[test]
    fn test_store_clear_prefix() {
        let mut store = CacheStore::new(300);

        store.set("GET-/api/cars{}", 1, None);
        store.set("GET-/api/cars/1{}", 2, None);
        store.set("GET-/api/values{}", 3, None);

        assert_eq!(store.clear("GET-/api/cars"), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("GET-/api/values{}"), Some(3));
    }

    #[test]
    fn test_clear_on_empty_store_is_noop() {
        let mut store = CacheStore::new(300);
        store.set("k", 1, Some(0));
        assert!(store.get("k").is_none());

        assert_eq!(store.clear("k"), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_clear_all() {
        let mut store = CacheStore::new(300);
        store.set("a", 1, None);
        store.set("b", 2, None);

        store.clear_all();

        assert!(store.is_empty());
    }

    #[test]
    fn test_store_stats() {
        let mut store = CacheStore::new(300);

        store.set("key1", "value1".to_string(), None);
        store.get("key1");
        store.get("nonexistent");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }
}
