//! Memoize Module
//!
//! Function memoization over the LRU and TTL caches.
//!
//! A memoized callable takes one argument value implementing
//! [`CallArgs`](crate::key::CallArgs): a tuple of positional arguments, or
//! [`Args`](crate::key::Args) for positional plus named ones. Results are
//! cached by the key built from that value.
//!
//! # Concurrency
//! The cache sits behind a mutex held only for the lookup and for the store,
//! never while the wrapped callable runs. Two concurrent calls with the same
//! arguments can therefore both miss and both invoke the callable; there is
//! no request coalescing.

mod future;
mod sync;

use std::time::Duration;

use crate::cache::{CacheStats, LruCache, TtlCache};
use crate::error::{CacheError, Result};
use crate::key::Key;

pub use future::{AsyncMemoize, AsyncMemoized};
pub use sync::{Memoize, Memoized};

// == Cache Kind ==
/// Eviction policy backing a memoizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    /// Least recently used
    Lru,
    /// Time to live, with oldest-position eviction on overflow
    Ttl(Duration),
}

impl CacheKind {
    /// Resolves a textual selector (`"lru"` or `"ttl"`, case-insensitive).
    ///
    /// `ttl` is only used by the `"ttl"` selector.
    pub fn from_selector(selector: &str, ttl: Duration) -> Result<Self> {
        match selector.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(CacheKind::Lru),
            "ttl" => Ok(CacheKind::Ttl(ttl)),
            other => Err(CacheError::InvalidArgument(format!(
                "unknown cache type: {}",
                other
            ))),
        }
    }
}

enum Store<V> {
    Lru(LruCache<Key, V>),
    Ttl(TtlCache<Key, V>),
}

// == Memo Cache ==
/// Cache state shared by the sync and async memoizers.
pub(crate) struct MemoCache<V> {
    store: Store<V>,
    results_to_discard: Vec<V>,
}

impl<V> MemoCache<V> {
    pub fn new(capacity: usize, kind: CacheKind) -> Result<Self> {
        let store = match kind {
            CacheKind::Lru => Store::Lru(LruCache::new(capacity)?),
            CacheKind::Ttl(ttl) => Store::Ttl(TtlCache::new(capacity, ttl)?),
        };

        Ok(Self {
            store,
            results_to_discard: Vec::new(),
        })
    }

    /// Replaces the list of results that are never stored.
    pub fn set_results_to_discard(&mut self, results: Vec<V>) {
        self.results_to_discard = results;
    }

    /// Sweeps expired TTL entries. No-op for LRU.
    pub fn evict_expired(&mut self) -> usize {
        match &mut self.store {
            Store::Lru(_) => 0,
            Store::Ttl(cache) => cache.evict_expired(),
        }
    }

    pub fn len(&self) -> usize {
        match &self.store {
            Store::Lru(cache) => cache.len(),
            Store::Ttl(cache) => cache.len(),
        }
    }

    pub fn stats(&self) -> CacheStats {
        match &self.store {
            Store::Lru(cache) => cache.stats(),
            Store::Ttl(cache) => cache.stats(),
        }
    }

    pub fn clear(&mut self) {
        match &mut self.store {
            Store::Lru(cache) => cache.clear(),
            Store::Ttl(cache) => cache.clear(),
        }
    }
}

impl<V: Clone + PartialEq> MemoCache<V> {
    /// Cached value for `key`, cloned out of the cache.
    ///
    /// TTL-backed lookups do not extend the entry's lifespan.
    pub fn lookup(&mut self, key: &Key) -> Option<V> {
        match &mut self.store {
            Store::Lru(cache) => cache.get(key).cloned(),
            Store::Ttl(cache) => cache.get(key).cloned(),
        }
    }

    /// Stores `result` under `key` unless it is one of the discarded results.
    ///
    /// Returns whether the result was stored.
    pub fn offer(&mut self, key: Key, result: &V) -> bool {
        if self.results_to_discard.contains(result) {
            return false;
        }

        match &mut self.store {
            Store::Lru(cache) => cache.set(key, result.clone()),
            Store::Ttl(cache) => cache.set(key, result.clone()),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_kind_from_selector() {
        let ttl = Duration::from_secs(5);
        assert_eq!(CacheKind::from_selector("lru", ttl).unwrap(), CacheKind::Lru);
        assert_eq!(CacheKind::from_selector("TTL", ttl).unwrap(), CacheKind::Ttl(ttl));

        let err = CacheKind::from_selector("lfu", ttl).unwrap_err();
        assert_eq!(err, CacheError::InvalidArgument("unknown cache type: lfu".to_string()));
    }

    #[test]
    fn test_memo_cache_rejects_invalid_construction() {
        assert!(MemoCache::<i32>::new(0, CacheKind::Lru).is_err());
        assert!(MemoCache::<i32>::new(3, CacheKind::Ttl(Duration::ZERO)).is_err());
    }

    #[test]
    fn test_memo_cache_offer_respects_discard_list() {
        let mut cache = MemoCache::new(3, CacheKind::Lru).unwrap();
        cache.set_results_to_discard(vec![None]);

        let key = Key::builder().arg(&1).unwrap().build();
        assert!(!cache.offer(key.clone(), &None));
        assert_eq!(cache.lookup(&key), None);

        assert!(cache.offer(key.clone(), &Some(7)));
        assert_eq!(cache.lookup(&key), Some(Some(7)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_memo_cache_evict_expired_is_noop_for_lru() {
        let mut cache = MemoCache::new(3, CacheKind::Lru).unwrap();
        cache.offer(Key::default(), &1);
        assert_eq!(cache.evict_expired(), 0);
        assert_eq!(cache.len(), 1);
    }
}
