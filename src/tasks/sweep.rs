//! TTL Sweep Task
//!
//! Opt-in background task that periodically removes expired cache entries.
//! Nothing in the crate starts it; the owner spawns and aborts it.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::TtlCache;
use crate::memoize::{AsyncMemoized, Memoized};

// == Sweep ==
/// Something holding expiring entries that can be swept through `&self`.
pub trait Sweep {
    /// Removes expired entries, returning how many were removed.
    fn sweep(&self) -> usize;
}

impl<K: Hash + Eq, V> Sweep for Mutex<TtlCache<K, V>> {
    fn sweep(&self) -> usize {
        self.lock().evict_expired()
    }
}

impl<F, V> Sweep for Memoized<F, V> {
    fn sweep(&self) -> usize {
        self.evict_expired()
    }
}

impl<F, V> Sweep for AsyncMemoized<F, V> {
    fn sweep(&self) -> usize {
        self.evict_expired()
    }
}

/// Spawns a background task that sweeps `target` every `interval`.
///
/// The returned handle aborts the task; dropping it leaves the task running.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(Mutex::new(TtlCache::new(1000, Duration::from_secs(30))?));
/// let sweep_handle = spawn_sweep_task(cache.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<S>(target: Arc<S>, interval: Duration) -> JoinHandle<()>
where
    S: Sweep + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!("Starting TTL sweep task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = target.sweep();
            if removed > 0 {
                info!("TTL sweep: removed {} expired entries", removed);
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }
    })
}
