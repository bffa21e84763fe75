//! Time-bounded in-process caches.
//!
//! [`TtlCache`] is the shared mechanism; [`SearchCache`] keys it by
//! normalised query, anchor bucket, and radius.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use wayfind_core::geo::bucket_key;
use wayfind_core::{normalize_query, CacheStats, Coordinate, GeocodedLocation};

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_MAX_ENTRIES: usize = 100;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    created_at: Instant,
}

/// String-keyed cache with a fixed TTL and an entry bound.
///
/// Expired entries are dropped lazily on lookup. When an insert would exceed
/// the bound, expired entries are swept first and then the oldest entry is
/// evicted. A bound of zero disables storage.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
    ttl: Duration,
    max_entries: usize,
}

impl<V: Clone> TtlCache<V> {
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_entries,
        }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().await;
        let fresh = entries
            .get(key)
            .map(|entry| entry.created_at.elapsed() < self.ttl)?;
        if fresh {
            entries.get(key).map(|entry| entry.value.clone())
        } else {
            entries.remove(key);
            None
        }
    }

    pub async fn insert(&self, key: String, value: V) {
        if self.max_entries == 0 {
            return;
        }
        let mut entries = self.entries.lock().await;
        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let ttl = self.ttl;
            entries.retain(|_, entry| entry.created_at.elapsed() < ttl);
            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.created_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }
        entries.insert(
            key,
            Entry {
                value,
                created_at: Instant::now(),
            },
        );
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Current entries, expired or not, with keys in sorted order.
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().await;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        CacheStats {
            size: keys.len(),
            keys,
        }
    }
}

/// A cached search outcome, ordered but not yet capped to `max_results`.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSearch {
    pub results: Vec<GeocodedLocation>,
}

/// Search results keyed by (normalised query, ~1 km anchor bucket, radius).
#[derive(Debug)]
pub struct SearchCache {
    inner: TtlCache<CachedSearch>,
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
    }
}

impl SearchCache {
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: TtlCache::new(ttl, max_entries),
        }
    }

    /// Build the cache key. Anchors in the same 0.01° bucket share a key.
    #[must_use]
    pub fn key(query: &str, anchor: Option<Coordinate>, radius_km: f64) -> String {
        let bucket = anchor.map_or_else(|| "none".to_string(), bucket_key);
        format!("{}|{bucket}|{radius_km}", normalize_query(query))
    }

    pub async fn lookup(
        &self,
        query: &str,
        anchor: Option<Coordinate>,
        radius_km: f64,
    ) -> Option<CachedSearch> {
        self.inner.get(&Self::key(query, anchor, radius_km)).await
    }

    pub async fn store(
        &self,
        query: &str,
        anchor: Option<Coordinate>,
        radius_km: f64,
        results: Vec<GeocodedLocation>,
    ) {
        let key = Self::key(query, anchor, radius_km);
        self.inner.insert(key, CachedSearch { results }).await;
    }

    pub async fn clear(&self) {
        self.inner.clear().await;
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(name: &str) -> GeocodedLocation {
        GeocodedLocation {
            latitude: 40.0,
            longitude: -73.0,
            address: name.to_string(),
            place_name: name.to_string(),
            city: None,
            state: None,
            country: None,
            place_type: None,
            relevance: 1.0,
            distance_km: None,
            source: "test".to_string(),
            place_id: None,
            composite_score: 0.0,
            extras: serde_json::Map::new(),
        }
    }

    #[test]
    fn key_normalises_query_and_buckets_anchor() {
        let a = SearchCache::key("  Coffee  Shop ", Some(Coordinate::new(40.0012, -73.0021)), 15.0);
        let b = SearchCache::key("coffee shop", Some(Coordinate::new(40.0031, -73.0049)), 15.0);
        assert_eq!(a, b);
        assert_eq!(a, "coffee shop|40.00,-73.00|15");
    }

    #[test]
    fn key_separates_distant_anchors_and_radii() {
        let near = SearchCache::key("coffee", Some(Coordinate::new(40.0, -73.0)), 15.0);
        let far = SearchCache::key("coffee", Some(Coordinate::new(40.02, -73.0)), 15.0);
        let wider = SearchCache::key("coffee", Some(Coordinate::new(40.0, -73.0)), 30.0);
        let none = SearchCache::key("coffee", None, 15.0);
        assert_ne!(near, far);
        assert_ne!(near, wider);
        assert_eq!(none, "coffee|none|15");
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = SearchCache::new(Duration::from_secs(300), 10);
        cache.store("coffee", None, 15.0, vec![location("A")]).await;

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(cache.lookup("coffee", None, 15.0).await.is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.lookup("coffee", None, 15.0).await.is_none());
        assert_eq!(cache.stats().await.size, 0);
    }

    #[tokio::test]
    async fn nearby_anchor_reads_entry_stored_under_same_bucket() {
        let cache = SearchCache::default();
        let stored_at = Some(Coordinate::new(40.0012, -73.0021));
        cache
            .store("coffee", stored_at, 15.0, vec![location("A"), location("B")])
            .await;

        let hit = cache
            .lookup("Coffee", Some(Coordinate::new(40.0031, -73.0049)), 15.0)
            .await
            .expect("same bucket should hit");
        assert_eq!(hit, CachedSearch { results: vec![location("A"), location("B")] });
    }

    #[tokio::test(start_paused = true)]
    async fn full_cache_evicts_oldest() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(300), 2);
        cache.insert("a".to_string(), 1).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.insert("b".to_string(), 2).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.insert("c".to_string(), 3).await;

        let stats = cache.stats().await;
        assert_eq!(stats.keys, vec!["b".to_string(), "c".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn full_cache_sweeps_expired_before_evicting() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(10), 2);
        cache.insert("old".to_string(), 1).await;
        tokio::time::advance(Duration::from_secs(11)).await;
        cache.insert("fresh".to_string(), 2).await;
        cache.insert("newer".to_string(), 3).await;

        let stats = cache.stats().await;
        assert_eq!(stats.keys, vec!["fresh".to_string(), "newer".to_string()]);
    }

    #[tokio::test]
    async fn zero_bound_disables_storage() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(10), 0);
        cache.insert("a".to_string(), 1).await;
        assert!(cache.get("a").await.is_none());
    }

    #[tokio::test]
    async fn clear_empties_cache() {
        let cache = SearchCache::default();
        cache.store("coffee", None, 15.0, vec![location("A")]).await;
        cache.store("tea", None, 15.0, vec![location("B")]).await;
        assert_eq!(cache.stats().await.size, 2);
        cache.clear().await;
        assert_eq!(cache.stats().await, CacheStats { size: 0, keys: vec![] });
    }
}
