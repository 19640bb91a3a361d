//! Bounded TTL result cache with access-order LRU eviction.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

use crate::cache::key::RequestKey;
use crate::observability::metrics;

#[derive(Debug)]
struct CacheEntry {
    payload: Value,
    created_at: Instant,
    ttl: Duration,
    /// Position in the recency index.
    touched: u64,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.created_at) > self.ttl
    }
}

#[derive(Debug, Default)]
struct LruState {
    entries: HashMap<RequestKey, CacheEntry>,
    /// touch tick -> key, oldest first.
    recency: BTreeMap<u64, RequestKey>,
    next_tick: u64,
}

impl LruState {
    fn tick(&mut self) -> u64 {
        let tick = self.next_tick;
        self.next_tick += 1;
        tick
    }

    fn remove(&mut self, key: &RequestKey) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.recency.remove(&entry.touched);
        Some(entry)
    }

    fn evict_oldest(&mut self) -> Option<RequestKey> {
        let (_, key) = self.recency.pop_first()?;
        self.entries.remove(&key);
        Some(key)
    }
}

/// Previously fetched payloads keyed by [`RequestKey`].
///
/// A successful read moves the entry to the freshest position, so eviction
/// removes the entry least recently inserted *or* read.
#[derive(Debug)]
pub struct ResultCache {
    state: Mutex<LruState>,
    capacity: usize,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(LruState::default()),
            capacity,
        }
    }

    /// Fresh payload for `key`. Expired entries are evicted and reported as a miss.
    pub fn get(&self, key: &RequestKey) -> Option<Value> {
        let mut state = self.state.lock().expect("result cache mutex poisoned");
        let now = Instant::now();

        let expired = state.entries.get(key)?.is_expired(now);
        if expired {
            state.remove(key);
            metrics::record_cache_size(state.entries.len());
            tracing::debug!(key = %key, "Cache entry expired");
            return None;
        }

        let tick = state.tick();
        let entry = state.entries.get_mut(key)?;
        let previous = std::mem::replace(&mut entry.touched, tick);
        let payload = entry.payload.clone();
        state.recency.remove(&previous);
        state.recency.insert(tick, key.clone());
        Some(payload)
    }

    /// Insert or overwrite an entry. A zero TTL stores nothing.
    pub fn set(&self, key: RequestKey, payload: Value, ttl: Duration) {
        if ttl.is_zero() || self.capacity == 0 {
            return;
        }

        let mut state = self.state.lock().expect("result cache mutex poisoned");
        state.remove(&key);

        let tick = state.tick();
        state.recency.insert(tick, key.clone());
        state.entries.insert(
            key,
            CacheEntry {
                payload,
                created_at: Instant::now(),
                ttl,
                touched: tick,
            },
        );

        while state.entries.len() > self.capacity {
            if let Some(evicted) = state.evict_oldest() {
                tracing::debug!(key = %evicted, "Cache entry evicted");
            }
        }
        metrics::record_cache_size(state.entries.len());
    }

    pub fn remove(&self, key: &RequestKey) -> bool {
        let mut state = self.state.lock().expect("result cache mutex poisoned");
        let removed = state.remove(key).is_some();
        metrics::record_cache_size(state.entries.len());
        removed
    }

    pub fn clear(&self) {
        let mut state = self.state.lock().expect("result cache mutex poisoned");
        state.entries.clear();
        state.recency.clear();
        metrics::record_cache_size(0);
    }

    /// Whether `key` is present, without touching recency or expiry.
    pub fn contains(&self, key: &RequestKey) -> bool {
        self.state.lock().expect("result cache mutex poisoned").entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.state.lock().expect("result cache mutex poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::key::Variables;
    use serde_json::json;
    use url::Url;

    fn key(n: usize) -> RequestKey {
        let url = Url::parse("https://indexer.example/graphql").unwrap();
        RequestKey::derive(&url, "query($n: Int) { block(n: $n) { hash } }", &Variables::new().set("n", n))
    }

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry() {
        let cache = ResultCache::new(10);
        cache.set(key(1), json!({"block": 1}), Duration::from_millis(500));

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(cache.get(&key(1)), Some(json!({"block": 1})));

        // Exactly at the TTL the entry is still fresh.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(cache.get(&key(1)).is_some());

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(cache.get(&key(1)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_ttl_is_not_stored() {
        let cache = ResultCache::new(10);
        cache.set(key(1), json!(1), Duration::ZERO);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_evicts_least_recently_inserted() {
        let cache = ResultCache::new(250);
        for n in 0..251 {
            cache.set(key(n), json!(n), TTL);
        }

        assert_eq!(cache.len(), 250);
        assert!(!cache.contains(&key(0)));
        assert!(cache.contains(&key(1)));
        assert!(cache.contains(&key(250)));
    }

    #[tokio::test]
    async fn test_read_protects_from_eviction() {
        let cache = ResultCache::new(250);
        for n in 0..250 {
            cache.set(key(n), json!(n), TTL);
        }

        // key(0) is the oldest insert, but reading it makes key(1) the victim.
        assert_eq!(cache.get(&key(0)), Some(json!(0)));
        cache.set(key(250), json!(250), TTL);

        assert_eq!(cache.len(), 250);
        assert!(cache.contains(&key(0)));
        assert!(!cache.contains(&key(1)));
    }

    #[tokio::test]
    async fn test_overwrite_refreshes_position() {
        let cache = ResultCache::new(2);
        cache.set(key(1), json!("old"), TTL);
        cache.set(key(2), json!(2), TTL);
        cache.set(key(1), json!("new"), TTL);
        cache.set(key(3), json!(3), TTL);

        assert_eq!(cache.get(&key(1)), Some(json!("new")));
        assert!(!cache.contains(&key(2)));
        assert!(cache.remove(&key(3)));
        cache.clear();
        assert!(cache.is_empty());
    }
}
