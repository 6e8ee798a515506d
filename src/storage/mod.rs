//! Durable Storage Module
//!
//! Thin synchronous string-keyed store the cache and limiter persist into so
//! their state survives restarts. Failures are reported as [`StorageError`]
//! and always recovered by the caller.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StorageError;

/// Storage key holding the serialized response cache map.
pub const CACHE_STORAGE_KEY: &str = "ai_response_cache";

/// Storage key holding the serialized rate-limit map.
pub const RATE_LIMIT_STORAGE_KEY: &str = "ai_rate_limits";

/// Persistent string key-value store.
///
/// Writes are whole-value overwrites. Several processes may share one
/// backing medium; the last write wins.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` when the key is absent.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes a key. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Store whose reads succeed with nothing and whose writes always fail.
    #[derive(Debug, Default)]
    pub struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }
    }
}
