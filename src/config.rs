//! Configuration Module
//!
//! Static lookup tables for cache TTLs and rate limits, plus deployment
//! settings loaded from environment variables.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use crate::models::CallType;

const MINUTE_MS: u64 = 60 * 1000;
const HOUR_MS: u64 = 60 * MINUTE_MS;

// == Cache Config ==
/// Per-type TTLs and the shared entry bound for the response cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL in milliseconds, per call type
    ttls: HashMap<CallType, u64>,
    /// Maximum number of entries across all types
    pub max_entries: usize,
}

impl CacheConfig {
    /// Returns the TTL in milliseconds for a call type.
    pub fn ttl_ms(&self, call_type: CallType) -> u64 {
        self.ttls.get(&call_type).copied().unwrap_or(HOUR_MS)
    }

    /// Overrides the TTL for one call type.
    pub fn with_ttl(mut self, call_type: CallType, ttl_ms: u64) -> Self {
        self.ttls.insert(call_type, ttl_ms.max(1));
        self
    }

    /// Overrides the entry bound.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        let ttls = HashMap::from([
            (CallType::Coaching, 30 * MINUTE_MS),
            (CallType::Suggestions, HOUR_MS),
            (CallType::Insights, 6 * HOUR_MS),
            (CallType::Decomposition, 24 * HOUR_MS),
        ]);
        Self {
            ttls,
            max_entries: 100,
        }
    }
}

// == Rate Limit ==
/// Fixed-window budget: `max_requests` per `window_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub max_requests: u32,
    pub window_ms: u64,
}

impl RateLimit {
    pub const fn new(max_requests: u32, window_ms: u64) -> Self {
        Self {
            max_requests,
            window_ms,
        }
    }
}

// == Rate Limit Config ==
/// Per-type budgets plus the global budget shared by every call.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    limits: HashMap<CallType, RateLimit>,
    /// Budget shared across all call types
    pub global: RateLimit,
}

impl RateLimitConfig {
    /// Returns the budget for a call type.
    pub fn limit(&self, call_type: CallType) -> RateLimit {
        self.limits
            .get(&call_type)
            .copied()
            .unwrap_or(RateLimit::new(10, HOUR_MS))
    }

    /// Overrides the budget for one call type.
    pub fn with_limit(mut self, call_type: CallType, limit: RateLimit) -> Self {
        self.limits.insert(call_type, limit);
        self
    }

    /// Overrides the global budget.
    pub fn with_global(mut self, limit: RateLimit) -> Self {
        self.global = limit;
        self
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        let limits = HashMap::from([
            (CallType::Coaching, RateLimit::new(20, HOUR_MS)),
            (CallType::Suggestions, RateLimit::new(10, HOUR_MS)),
            (CallType::Insights, RateLimit::new(10, HOUR_MS)),
            (CallType::Decomposition, RateLimit::new(5, HOUR_MS)),
        ]);
        Self {
            limits,
            global: RateLimit::new(50, HOUR_MS),
        }
    }
}

// == Config ==
/// Deployment settings.
///
/// The TTL and rate-limit tables are not read from the environment; tune
/// them in code through [`CacheConfig`] and [`RateLimitConfig`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the file-backed durable store
    pub storage_dir: PathBuf,
    /// Base URL of the AI HTTP API
    pub api_base_url: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `AI_STORAGE_DIR` - Durable store directory (default: `.ai_mediator`)
    /// - `AI_API_BASE_URL` - AI API base URL (default: `http://localhost:3000`)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            storage_dir: env::var("AI_STORAGE_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            api_base_url: env::var("AI_API_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.api_base_url),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(".ai_mediator"),
            api_base_url: "http://localhost:3000".to_string(),
        }
    }
}
