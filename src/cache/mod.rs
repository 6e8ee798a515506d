//! Cache Module
//!
//! Provides the persisted response cache with per-type TTLs and a shared
//! entry bound.

mod entry;
mod key;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use key::{hash_input, CacheKey};
pub use stats::CacheStats;
pub use store::ResponseCache;
