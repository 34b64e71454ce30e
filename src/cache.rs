//! In-memory TTL cache for search result pages.
//!
//! Keyed by a fingerprint of (raw query, page, filters). Entries expire
//! logically at read time; capacity is enforced at write time by first
//! purging expired entries, then evicting oldest-by-insertion entries
//! until one slot below capacity is free. There is no background sweep.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use crate::config::CacheSettings;
use crate::filters::SearchFilter;
use crate::types::SearchResult;

/// One cached page of results together with the provider's total estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPage {
    /// Scored, sorted results for the page.
    pub results: Vec<SearchResult>,
    /// Provider's estimated total across all pages.
    pub total: u64,
}

#[derive(Debug)]
struct CacheEntry {
    payload: CachedPage,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.created_at) >= self.ttl
    }
}

/// Bounded TTL cache for search pages.
///
/// When constructed with `enabled = false`, `get` always misses and
/// `insert` is a no-op.
#[derive(Debug)]
pub struct ResultCache {
    entries: HashMap<u64, CacheEntry>,
    max_size: usize,
    enabled: bool,
}

impl ResultCache {
    /// Create a cache from the configured settings.
    pub fn new(settings: &CacheSettings) -> Self {
        Self {
            entries: HashMap::new(),
            max_size: settings.max_size,
            enabled: settings.enabled,
        }
    }

    /// Look up a cached page, evicting it if its TTL has elapsed.
    pub fn get(&mut self, key: u64) -> Option<CachedPage> {
        if !self.enabled {
            return None;
        }
        let now = Instant::now();
        match self.entries.get(&key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.payload.clone()),
            Some(_) => {
                self.entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Store a page under the given key with the given TTL.
    pub fn insert(&mut self, key: u64, payload: CachedPage, ttl: Duration) {
        if !self.enabled {
            return;
        }
        // Overwriting an existing key needs no room.
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_size {
            self.make_room();
        }
        self.entries.insert(
            key,
            CacheEntry {
                payload,
                created_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Purge expired entries, then evict oldest-by-insertion entries
    /// until one slot below capacity is free.
    fn make_room(&mut self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));

        if self.entries.len() >= self.max_size {
            let mut by_age: Vec<(u64, Instant)> = self
                .entries
                .iter()
                .map(|(key, entry)| (*key, entry.created_at))
                .collect();
            by_age.sort_by_key(|(_, created_at)| *created_at);

            let excess = self.entries.len() - self.max_size + 1;
            for (key, _) in by_age.into_iter().take(excess) {
                self.entries.remove(&key);
            }
        }
    }
}

/// Deterministic fingerprint of a search request.
///
/// Hashes the raw query, the page number and the canonical JSON
/// serialization of the filter. Collision-resistant enough for cache
/// keying; not security-sensitive.
pub fn fingerprint(query: &str, page: usize, filters: &SearchFilter) -> u64 {
    let mut hasher = DefaultHasher::new();
    query.hash(&mut hasher);
    page.hash(&mut hasher);
    // BTreeMap-backed custom filters keep this serialization canonical.
    serde_json::to_string(filters)
        .unwrap_or_default()
        .hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::DateRange;

    fn settings(enabled: bool, max_size: usize) -> CacheSettings {
        CacheSettings {
            enabled,
            search_ttl: 3600,
            max_size,
        }
    }

    fn page(total: u64) -> CachedPage {
        CachedPage {
            results: Vec::new(),
            total,
        }
    }

    #[test]
    fn round_trip_within_ttl() {
        let mut cache = ResultCache::new(&settings(true, 10));
        cache.insert(1, page(42), Duration::from_secs(60));
        assert_eq!(cache.get(1), Some(page(42)));
    }

    #[test]
    fn miss_for_unknown_key() {
        let mut cache = ResultCache::new(&settings(true, 10));
        assert!(cache.get(99).is_none());
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let mut cache = ResultCache::new(&settings(true, 10));
        cache.insert(1, page(1), Duration::ZERO);
        assert!(cache.get(1).is_none());
        // Expired entry was evicted at read time.
        assert!(cache.is_empty());
    }

    #[test]
    fn expires_after_ttl_elapses() {
        let mut cache = ResultCache::new(&settings(true, 10));
        cache.insert(1, page(1), Duration::from_millis(5));
        std::thread::sleep(Duration::from_millis(10));
        assert!(cache.get(1).is_none());
    }

    #[test]
    fn disabled_cache_never_stores() {
        let mut cache = ResultCache::new(&settings(false, 10));
        cache.insert(1, page(1), Duration::from_secs(60));
        assert!(cache.get(1).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn capacity_never_exceeded() {
        let max_size = 5;
        let mut cache = ResultCache::new(&settings(true, max_size));
        for key in 0..(max_size as u64 + 1) {
            cache.insert(key, page(key), Duration::from_secs(60));
        }
        assert!(cache.len() <= max_size);
    }

    #[test]
    fn eviction_drops_oldest_insertion_first() {
        let mut cache = ResultCache::new(&settings(true, 3));
        cache.insert(1, page(1), Duration::from_secs(60));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert(2, page(2), Duration::from_secs(60));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert(3, page(3), Duration::from_secs(60));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert(4, page(4), Duration::from_secs(60));

        assert!(cache.get(1).is_none(), "oldest entry should be evicted");
        assert!(cache.get(4).is_some());
    }

    #[test]
    fn same_key_refresh_at_capacity_evicts_nothing() {
        let mut cache = ResultCache::new(&settings(true, 2));
        cache.insert(1, page(1), Duration::from_secs(60));
        cache.insert(2, page(2), Duration::from_secs(60));

        // Refreshing an existing key at capacity overwrites in place.
        cache.insert(1, page(10), Duration::from_secs(60));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(1), Some(page(10)));
        assert!(cache.get(2).is_some());
    }

    #[test]
    fn expired_entries_purged_before_live_ones_evicted() {
        let mut cache = ResultCache::new(&settings(true, 3));
        cache.insert(1, page(1), Duration::ZERO);
        cache.insert(2, page(2), Duration::from_secs(60));
        cache.insert(3, page(3), Duration::from_secs(60));
        cache.insert(4, page(4), Duration::from_secs(60));

        // The expired entry 1 made room; live entries 2 and 3 survive.
        assert!(cache.get(2).is_some());
        assert!(cache.get(3).is_some());
        assert!(cache.get(4).is_some());
    }

    #[test]
    fn fingerprint_deterministic() {
        let filters = SearchFilter::default();
        assert_eq!(
            fingerprint("rust", 1, &filters),
            fingerprint("rust", 1, &filters)
        );
    }

    #[test]
    fn fingerprint_sensitive_to_query_page_and_filters() {
        let filters = SearchFilter::default();
        let base = fingerprint("rust", 1, &filters);
        assert_ne!(base, fingerprint("python", 1, &filters));
        assert_ne!(base, fingerprint("rust", 2, &filters));

        let week = SearchFilter {
            date_range: DateRange::Week,
            ..SearchFilter::default()
        };
        assert_ne!(base, fingerprint("rust", 1, &week));
    }
}
