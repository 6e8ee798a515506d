//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// A cached call result with its creation and expiry instants.
///
/// Serialized as `{ "data": ..., "timestamp": ..., "expiresAt": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T = Value> {
    /// The stored payload
    pub data: T,
    /// Creation timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: i64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates an entry created at `now_ms` that lives for `ttl_ms`.
    pub fn new(data: T, now_ms: i64, ttl_ms: u64) -> Self {
        let ttl = i64::try_from(ttl_ms.max(1)).unwrap_or(i64::MAX);
        Self {
            data,
            timestamp: now_ms,
            expires_at: now_ms.saturating_add(ttl),
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now` is strictly past `expires_at`.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at
    }

    /// Holds the `expires_at > timestamp` invariant.
    pub fn is_well_formed(&self) -> bool {
        self.expires_at > self.timestamp
    }

    // == Time To Live ==
    /// Remaining lifetime in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now_ms: i64) -> u64 {
        u64::try_from(self.expires_at.saturating_sub(now_ms)).unwrap_or(0)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(json!({"message": "hi"}), 1_000, 500);

        assert_eq!(entry.timestamp, 1_000);
        assert_eq!(entry.expires_at, 1_500);
        assert!(entry.is_well_formed());
        assert!(!entry.is_expired(1_000));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new("v", 0, 100);

        assert!(!entry.is_expired(100), "Still live at expires_at");
        assert!(entry.is_expired(101));
    }

    #[test]
    fn test_zero_ttl_still_satisfies_invariant() {
        let entry = CacheEntry::new("v", 10, 0);
        assert!(entry.is_well_formed());
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new("v", 0, 10_000);

        assert_eq!(entry.ttl_remaining_ms(4_000), 6_000);
        assert_eq!(entry.ttl_remaining_ms(20_000), 0);
    }

    #[test]
    fn test_serialized_field_names() {
        let entry = CacheEntry::new(json!(1), 5, 5);
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value, json!({"data": 1, "timestamp": 5, "expiresAt": 10}));
    }
}
