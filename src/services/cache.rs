use dashmap::DashMap;
use std::time::Duration;

/// A cached upstream response.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub data: T,
    /// Epoch milliseconds of the successful fetch.
    pub fetched_at: i64,
    pub key: String,
}

impl<T> CacheEntry<T> {
    /// Whether the entry is still within `ttl` at `now` (epoch ms).
    pub fn is_live(&self, ttl: Duration, now: i64) -> bool {
        now - self.fetched_at <= ttl.as_millis() as i64
    }
}

/// A thread-safe cache keyed by request, with TTL checked on read.
///
/// Expired entries are kept so they can be served as stale data when a
/// refresh fails. Growth is bounded by `max_entries`: inserting a new key
/// into a full cache evicts the entry with the oldest fetch time.
pub struct TtlCache<T> {
    data: DashMap<String, CacheEntry<T>>,
    ttl: Duration,
    max_entries: usize,
}

impl<T: Clone> TtlCache<T> {
    /// Create a new cache with the given TTL and capacity.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            data: DashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a live entry, or `None` if missing or expired at `now`.
    pub fn get_live(&self, key: &str, now: i64) -> Option<CacheEntry<T>> {
        let entry = self.data.get(key)?;
        if entry.is_live(self.ttl, now) {
            Some(entry.value().clone())
        } else {
            None
        }
    }

    /// Get an entry regardless of age.
    pub fn get_any(&self, key: &str) -> Option<CacheEntry<T>> {
        self.data.get(key).map(|entry| entry.value().clone())
    }

    /// Replace the entry for `key` wholesale.
    pub fn insert(&self, key: &str, data: T, fetched_at: i64) {
        if !self.data.contains_key(key) && self.data.len() >= self.max_entries {
            self.evict_oldest();
        }

        self.data.insert(
            key.to_string(),
            CacheEntry {
                data,
                fetched_at,
                key: key.to_string(),
            },
        );
    }

    fn evict_oldest(&self) {
        let oldest = self
            .data
            .iter()
            .min_by_key(|entry| entry.fetched_at)
            .map(|entry| entry.key().clone());

        if let Some(key) = oldest {
            self.data.remove(&key);
        }
    }

    /// Visit every entry, live or not.
    pub fn for_each(&self, mut f: impl FnMut(&CacheEntry<T>)) {
        for entry in self.data.iter() {
            f(entry.value());
        }
    }

    /// Remove a value from the cache.
    pub fn evict(&self, key: &str) -> Option<CacheEntry<T>> {
        self.data.remove(key).map(|(_, entry)| entry)
    }

    /// Clear all entries from the cache.
    pub fn clear(&self) {
        self.data.clear();
    }

    /// Get the number of entries in the cache (including expired).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_cache_basic() {
        let cache = TtlCache::new(Duration::from_secs(60), 10);
        cache.insert("key1", "value1".to_string(), NOW);
        assert_eq!(cache.get_live("key1", NOW).unwrap().data, "value1");
        assert!(cache.get_live("key2", NOW).is_none());
    }

    #[test]
    fn test_cache_expiration_keeps_stale_entry() {
        let cache = TtlCache::new(Duration::from_secs(60), 10);
        cache.insert("key1", 1u32, NOW);

        assert!(cache.get_live("key1", NOW + 60_000).is_some());
        assert!(cache.get_live("key1", NOW + 60_001).is_none());

        let stale = cache.get_any("key1").unwrap();
        assert_eq!(stale.data, 1);
        assert_eq!(stale.fetched_at, NOW);
        assert_eq!(stale.key, "key1");
    }

    #[test]
    fn test_cache_overwrite() {
        let cache = TtlCache::new(Duration::from_secs(60), 10);
        cache.insert("key", "value1".to_string(), NOW);
        cache.insert("key", "value2".to_string(), NOW + 5);

        let entry = cache.get_any("key").unwrap();
        assert_eq!(entry.data, "value2");
        assert_eq!(entry.fetched_at, NOW + 5);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_capacity_evicts_oldest() {
        let cache = TtlCache::new(Duration::from_secs(60), 2);
        cache.insert("a", 1, NOW);
        cache.insert("b", 2, NOW - 1_000);
        cache.insert("c", 3, NOW + 1_000);

        assert_eq!(cache.len(), 2);
        assert!(cache.get_any("b").is_none());
        assert!(cache.get_any("a").is_some());
        assert!(cache.get_any("c").is_some());
    }

    #[test]
    fn test_cache_refresh_at_capacity_does_not_evict() {
        let cache = TtlCache::new(Duration::from_secs(60), 2);
        cache.insert("a", 1, NOW);
        cache.insert("b", 2, NOW);
        cache.insert("a", 10, NOW + 1);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_any("b").unwrap().data, 2);
    }

    #[test]
    fn test_cache_evict_and_clear() {
        let cache = TtlCache::new(Duration::from_secs(60), 10);
        cache.insert("key1", "value1".to_string(), NOW);
        cache.insert("key2", "value2".to_string(), NOW);

        assert_eq!(cache.evict("key1").unwrap().data, "value1");
        assert!(cache.evict("key1").is_none());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_for_each_visits_all() {
        let cache = TtlCache::new(Duration::from_millis(1), 10);
        cache.insert("a", 1, NOW - 10_000);
        cache.insert("b", 2, NOW);

        let mut total = 0;
        cache.for_each(|entry| total += entry.data);
        assert_eq!(total, 3);
    }
}
