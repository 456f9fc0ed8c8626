//! Asynchronous Memoizer
//!
//! Same contract as the synchronous memoizer for callables returning a
//! future. The cache is consulted before the await and updated after it,
//! never across it.

use std::future::Future;

use parking_lot::Mutex;
use tracing::trace;

use crate::cache::CacheStats;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::key::CallArgs;
use crate::memoize::{CacheKind, MemoCache};

// == Async Memoize ==
/// Memoizer configuration for async callables.
pub struct AsyncMemoize<V> {
    cache: MemoCache<V>,
}

impl<V> AsyncMemoize<V> {
    /// # Errors
    /// `CacheError::InvalidArgument` if `capacity` is zero or a TTL kind
    /// carries a zero duration.
    pub fn new(capacity: usize, kind: CacheKind) -> Result<Self> {
        Ok(Self {
            cache: MemoCache::new(capacity, kind)?,
        })
    }

    /// Builds a memoizer from a loaded [`Config`].
    ///
    /// # Errors
    /// `CacheError::InvalidArgument` for an unknown cache type or invalid sizes.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.capacity, config.cache_kind()?)
    }

    /// Results equal to any of `results` are returned but never cached.
    pub fn discard_results(mut self, results: impl IntoIterator<Item = V>) -> Self {
        self.cache.set_results_to_discard(results.into_iter().collect());
        self
    }

    // == Wrap ==
    /// Wraps an async `func`. The returned value's `call` awaits `func` only
    /// on a miss.
    pub fn wrap<F>(self, func: F) -> AsyncMemoized<F, V> {
        AsyncMemoized {
            func,
            cache: Mutex::new(self.cache),
        }
    }
}

// == Async Memoized ==
/// An async callable wrapped with a result cache.
///
/// Concurrent calls with equal arguments that both miss will both run the
/// callable; the later store overwrites the earlier one. Dropping a call
/// future before it completes stores nothing.
pub struct AsyncMemoized<F, V> {
    func: F,
    cache: Mutex<MemoCache<V>>,
}

impl<F, V: Clone + PartialEq> AsyncMemoized<F, V> {
    // == Call ==
    /// Returns the cached result for `args`, or awaits the callable and
    /// caches what it resolves to.
    pub async fn call<A, Fut>(&self, args: A) -> Result<V>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = V>,
        A: CallArgs,
    {
        let key = args.to_key()?;

        let cached = self.cache.lock().lookup(&key);
        if let Some(value) = cached {
            trace!("async memoize hit");
            return Ok(value);
        }

        trace!("async memoize miss, awaiting callable");
        let result = (self.func)(args).await;
        self.cache.lock().offer(key, &result);
        Ok(result)
    }

    // == Try Call ==
    /// Like [`call`](Self::call) for fallible callables. Only `Ok` values are
    /// cached; an `Err` is returned unchanged.
    pub async fn try_call<A, E, Fut>(&self, args: A) -> std::result::Result<V, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
        A: CallArgs,
        E: From<CacheError>,
    {
        let key = args.to_key()?;

        let cached = self.cache.lock().lookup(&key);
        if let Some(value) = cached {
            trace!("async memoize hit");
            return Ok(value);
        }

        trace!("async memoize miss, awaiting callable");
        let result = (self.func)(args).await?;
        self.cache.lock().offer(key, &result);
        Ok(result)
    }
}

impl<F, V> AsyncMemoized<F, V> {
    /// Sweeps expired results from a TTL-backed cache. Always 0 for LRU.
    pub fn evict_expired(&self) -> usize {
        self.cache.lock().evict_expired()
    }

    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Returns true if no results are cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Stats ==
    /// Returns a snapshot of the underlying cache counters.
    pub fn stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }

    // == Clear ==
    /// Drops every cached result.
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    /// The wrapped callable, for calls that must bypass the cache.
    pub fn inner(&self) -> &F {
        &self.func
    }
}
