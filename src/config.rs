//! Configuration Module
//!
//! Loads memoizer and sweep settings from environment variables.

use std::env;
use std::time::Duration;

use crate::error::Result;
use crate::memoize::CacheKind;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of cached entries
    pub capacity: usize,
    /// Cache type selector, `lru` or `ttl`
    pub cache_type: String,
    /// Entry lifespan in milliseconds, used by `ttl` caches
    pub ttl_ms: u64,
    /// Background sweep interval in milliseconds
    pub sweep_interval_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `POWER_CACHE_CAPACITY` - Maximum entries (default: 128)
    /// - `POWER_CACHE_TYPE` - `lru` or `ttl` (default: `lru`)
    /// - `POWER_CACHE_TTL_MS` - Entry lifespan in milliseconds (default: 60000)
    /// - `POWER_CACHE_SWEEP_INTERVAL_MS` - Sweep frequency in milliseconds (default: 1000)
    ///
    /// Unparseable numbers fall back to their defaults. The cache type is
    /// validated later, by [`cache_kind`](Self::cache_kind).
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            capacity: lookup("POWER_CACHE_CAPACITY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity),
            cache_type: lookup("POWER_CACHE_TYPE").unwrap_or(defaults.cache_type),
            ttl_ms: lookup("POWER_CACHE_TTL_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.ttl_ms),
            sweep_interval_ms: lookup("POWER_CACHE_SWEEP_INTERVAL_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_interval_ms),
        }
    }

    /// Resolves `cache_type` and `ttl_ms` into a [`CacheKind`].
    ///
    /// # Errors
    /// `CacheError::InvalidArgument` for an unknown cache type.
    pub fn cache_kind(&self) -> Result<CacheKind> {
        CacheKind::from_selector(&self.cache_type, self.ttl())
    }

    /// Entry lifespan for `ttl` caches.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Interval for [`spawn_sweep_task`](crate::tasks::spawn_sweep_task).
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 128,
            cache_type: "lru".to_string(),
            ttl_ms: 60_000,
            sweep_interval_ms: 1_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::error::CacheError;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.capacity, 128);
        assert_eq!(config.cache_type, "lru");
        assert_eq!(config.ttl_ms, 60_000);
        assert_eq!(config.sweep_interval_ms, 1_000);
        assert_eq!(config.cache_kind().unwrap(), CacheKind::Lru);
    }

    #[test]
    fn test_config_from_empty_lookup_uses_defaults() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_from_lookup() {
        let config = Config::from_lookup(lookup_from(&[
            ("POWER_CACHE_CAPACITY", "16"),
            ("POWER_CACHE_TYPE", "ttl"),
            ("POWER_CACHE_TTL_MS", "250"),
            ("POWER_CACHE_SWEEP_INTERVAL_MS", "50"),
        ]));

        assert_eq!(config.capacity, 16);
        assert_eq!(
            config.cache_kind().unwrap(),
            CacheKind::Ttl(Duration::from_millis(250))
        );
        assert_eq!(config.sweep_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_config_unparseable_numbers_fall_back() {
        let config = Config::from_lookup(lookup_from(&[("POWER_CACHE_CAPACITY", "lots")]));
        assert_eq!(config.capacity, 128);
    }

    #[test]
    fn test_config_unknown_cache_type() {
        let config = Config::from_lookup(lookup_from(&[("POWER_CACHE_TYPE", "fifo")]));
        assert!(matches!(
            config.cache_kind(),
            Err(CacheError::InvalidArgument(_))
        ));
    }
}
