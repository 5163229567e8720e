//! Cache Store Module
//!
//! Unsynchronized map from request key to payload. [`ExpiringCache`]
//! wraps it in a mutex and owns the reclamation task that sweeps it.
//!
//! [`ExpiringCache`]: crate::cache::ExpiringCache

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{CacheEntry, CacheStats, SweepPolicy};

// == Cache Store ==
/// Key-to-payload storage with usage statistics.
#[derive(Debug, Default)]
pub(crate) struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Usage statistics
    stats: CacheStats,
}

impl CacheStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Add ==
    /// Stores `payload` under `key`, stamped with the current instant.
    ///
    /// Any previous entry for the key is replaced (last write wins).
    pub fn add(&mut self, key: impl Into<String>, payload: impl Into<Arc<[u8]>>) {
        self.add_at(key, payload, Instant::now());
    }

    /// Stores `payload` under `key` with an explicit creation instant.
    pub fn add_at(&mut self, key: impl Into<String>, payload: impl Into<Arc<[u8]>>, now: Instant) {
        self.entries
            .insert(key.into(), CacheEntry::created_at(payload.into(), now));
        self.stats.record_insertion();
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns the payload stored under `key`, if any.
    ///
    /// No expiry check happens here: an entry stays readable until a sweep
    /// physically removes it.
    pub fn get(&mut self, key: &str) -> Option<Arc<[u8]>> {
        match self.entries.get(key) {
            Some(entry) => {
                self.stats.record_hit();
                Some(Arc::clone(&entry.payload))
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Sweep ==
    /// Removes every entry `policy` selects as of `now`.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&mut self, now: Instant, ttl: Duration, policy: SweepPolicy) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| !policy.should_reclaim(entry, now, ttl));
        let removed = before - self.entries.len();

        self.stats.record_sweep(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Stats ==
    /// Returns a snapshot of the current statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    #[allow(dead_code)]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_millis(100);

    #[test]
    fn test_store_new() {
        let store = CacheStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_add_and_get() {
        let mut store = CacheStore::new();

        store.add("https://example.test/location-area?offset=0", vec![1, 2, 3]);
        let payload = store.get("https://example.test/location-area?offset=0").unwrap();

        assert_eq!(&*payload, &[1, 2, 3]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = CacheStore::new();
        assert!(store.get("nonexistent").is_none());
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = CacheStore::new();

        store.add("key1", b"first".to_vec());
        store.add("key1", b"second".to_vec());

        assert_eq!(&*store.get("key1").unwrap(), b"second");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_empty_key_is_allowed() {
        let mut store = CacheStore::new();

        store.add("", vec![0]);
        assert!(store.contains_key(""));
        assert_eq!(&*store.get("").unwrap(), &[0]);
    }

    #[test]
    fn test_sweep_stale_removes_only_old_entries() {
        let start = Instant::now();
        let mut store = CacheStore::new();

        store.add_at("old", vec![1], start);
        store.add_at("young", vec![2], start + Duration::from_millis(80));

        let removed = store.sweep(start + Duration::from_millis(150), TTL, SweepPolicy::Stale);

        assert_eq!(removed, 1);
        assert!(!store.contains_key("old"));
        assert!(store.contains_key("young"));
    }

    #[test]
    fn test_sweep_clear_all_removes_everything() {
        let start = Instant::now();
        let mut store = CacheStore::new();

        store.add_at("old", vec![1], start);
        store.add_at("young", vec![2], start + Duration::from_millis(80));

        let removed = store.sweep(start + Duration::from_millis(90), TTL, SweepPolicy::ClearAll);

        assert_eq!(removed, 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_stats() {
        let start = Instant::now();
        let mut store = CacheStore::new();

        store.add_at("key1", vec![1], start);
        store.add_at("key2", vec![2], start);
        store.get("key1"); // hit
        store.get("nonexistent"); // miss
        store.sweep(start + Duration::from_secs(1), TTL, SweepPolicy::Stale);

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.insertions, 2);
        assert_eq!(stats.sweeps, 1);
        assert_eq!(stats.reclaimed, 2);
        assert_eq!(stats.total_entries, 0);
    }
}
