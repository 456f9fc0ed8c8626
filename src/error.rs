//! Error types for the cache crate
//!
//! Provides unified error handling using thiserror.

use std::fmt::{self, Debug, Display};

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache construction and key building.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Non-positive capacity or ttl, unknown cache type, malformed arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Argument value cannot be turned into hashable key material
    #[error("Unhashable key material: {0}")]
    Unhashable(String),
}

impl serde::ser::Error for CacheError {
    fn custom<T: Display>(msg: T) -> Self {
        CacheError::Unhashable(msg.to_string())
    }
}

// == Key Not Found ==
/// Indexed access or deletion on a key that is absent (or expired).
///
/// Carries the offending key so callers can recover it.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyNotFound<K> {
    pub key: K,
}

impl<K> KeyNotFound<K> {
    /// Wraps the key that was not found.
    pub fn new(key: K) -> Self {
        Self { key }
    }

    /// Consumes the error, returning the key.
    pub fn into_key(self) -> K {
        self.key
    }
}

impl<K: Debug> Debug for KeyNotFound<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyNotFound").field("key", &self.key).finish()
    }
}

impl<K: Debug> Display for KeyNotFound<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key not found: {:?}", self.key)
    }
}

impl<K: Debug> std::error::Error for KeyNotFound<K> {}

// == Result Type Alias ==
/// Convenience Result type for the cache crate.
pub type Result<T> = std::result::Result<T, CacheError>;
