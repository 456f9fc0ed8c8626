//! Synchronous Memoizer
//!
//! Wraps a plain callable so repeated calls with equal arguments are served
//! from a cache.

use parking_lot::Mutex;
use tracing::trace;

use crate::cache::CacheStats;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::key::CallArgs;
use crate::memoize::{CacheKind, MemoCache};

// == Memoize ==
/// Memoizer configuration, validated at construction.
///
/// ```
/// use power_cache::memoize::{CacheKind, Memoize};
///
/// let square = Memoize::new(16, CacheKind::Lru)?.wrap(|(x,): (u64,)| x * x);
/// assert_eq!(square.call((12,))?, 144);
/// assert_eq!(square.call((12,))?, 144);
/// assert_eq!(square.len(), 1);
/// # Ok::<(), power_cache::CacheError>(())
/// ```
pub struct Memoize<V> {
    cache: MemoCache<V>,
}

impl<V> Memoize<V> {
    /// # Errors
    /// `CacheError::InvalidArgument` if `capacity` is zero or a TTL kind
    /// carries a zero duration.
    pub fn new(capacity: usize, kind: CacheKind) -> Result<Self> {
        Ok(Self {
            cache: MemoCache::new(capacity, kind)?,
        })
    }

    /// Builds a memoizer from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.capacity, config.cache_kind()?)
    }

    /// Results equal to any of `results` are returned but never cached.
    pub fn discard_results(mut self, results: impl IntoIterator<Item = V>) -> Self {
        self.cache.set_results_to_discard(results.into_iter().collect());
        self
    }

    // == Wrap ==
    /// Wraps `func`, returning a callable with the same argument and result
    /// types whose results are cached.
    pub fn wrap<F>(self, func: F) -> Memoized<F, V> {
        Memoized {
            func,
            cache: Mutex::new(self.cache),
        }
    }
}

// == Memoized ==
/// A callable wrapped with a result cache.
///
/// [`call`](Self::call) is available when the callable is `Fn(A) -> V` and
/// [`try_call`](Self::try_call) when it is `Fn(A) -> Result<V, E>`.
pub struct Memoized<F, V> {
    func: F,
    cache: Mutex<MemoCache<V>>,
}

impl<F, V: Clone + PartialEq> Memoized<F, V> {
    // == Call ==
    /// Returns the cached result for `args`, or invokes the callable and
    /// caches what it returns.
    ///
    /// # Errors
    /// `CacheError::Unhashable` if `args` cannot be turned into a key. The
    /// callable is not invoked in that case.
    pub fn call<A>(&self, args: A) -> Result<V>
    where
        F: Fn(A) -> V,
        A: CallArgs,
    {
        let key = args.to_key()?;

        let cached = self.cache.lock().lookup(&key);
        if let Some(value) = cached {
            trace!("memoize hit");
            return Ok(value);
        }

        trace!("memoize miss, invoking callable");
        let result = (self.func)(args);
        self.cache.lock().offer(key, &result);
        Ok(result)
    }

    // == Try Call ==
    /// Like [`call`](Self::call) for fallible callables.
    ///
    /// Only `Ok` values are cached. An `Err` from the callable is returned
    /// unchanged; a key construction failure is converted into `E`.
    pub fn try_call<A, E>(&self, args: A) -> std::result::Result<V, E>
    where
        F: Fn(A) -> std::result::Result<V, E>,
        A: CallArgs,
        E: From<CacheError>,
    {
        let key = args.to_key()?;

        let cached = self.cache.lock().lookup(&key);
        if let Some(value) = cached {
            trace!("memoize hit");
            return Ok(value);
        }

        trace!("memoize miss, invoking callable");
        let result = (self.func)(args)?;
        self.cache.lock().offer(key, &result);
        Ok(result)
    }
}

impl<F, V> Memoized<F, V> {
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
