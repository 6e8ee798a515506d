//! Call Mediator
//!
//! Orchestrates one mediated AI call: cache lookup, rate-limit check, the
//! underlying call, then cache write.
//!
//! A cache hit returns straight away and spends no rate-limit budget. Only the
//! rate-limit denial is synthesized here; errors from the underlying call are
//! returned unchanged. There is no retry loop and no coalescing of concurrent
//! identical misses: two callers missing on the same key both perform the call.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheStats, ResponseCache};
use crate::clock::{Clock, SystemClock};
use crate::config::{CacheConfig, Config, RateLimitConfig};
use crate::error::{AiError, Result};
use crate::limiter::{RateLimitStatus, RateLimiter, RateScope, UsageSnapshot};
use crate::models::CallType;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

/// Per-call switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Neither read nor write the cache
    pub skip_cache: bool,
    /// Neither check nor spend rate-limit budget
    pub skip_rate_limit: bool,
}

impl CallOptions {
    pub fn skip_cache() -> Self {
        Self {
            skip_cache: true,
            ..Self::default()
        }
    }

    pub fn skip_rate_limit() -> Self {
        Self {
            skip_rate_limit: true,
            ..Self::default()
        }
    }
}

/// Result envelope of a mediated call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mediated<T> {
    pub data: T,
    /// True when served from the response cache
    pub from_cache: bool,
}

impl<T> Mediated<T> {
    pub fn fresh(data: T) -> Self {
        Self {
            data,
            from_cache: false,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Mediated<U> {
        Mediated {
            data: f(self.data),
            from_cache: self.from_cache,
        }
    }
}

// == Call Mediator ==
/// Shared context holding the response cache and the rate limiter.
///
/// Build one at application start and clone it into every consumer; clones
/// share the same state.
#[derive(Clone)]
pub struct CallMediator {
    /// Response cache
    pub cache: Arc<RwLock<ResponseCache>>,
    /// Two-tier rate limiter
    pub limiter: Arc<RwLock<RateLimiter>>,
}

impl CallMediator {
    /// Creates a mediator whose cache and limiter persist into `storage`.
    pub fn new(
        cache_config: CacheConfig,
        limit_config: RateLimitConfig,
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = ResponseCache::new(cache_config, storage.clone(), clock.clone());
        let limiter = RateLimiter::new(limit_config, storage, clock);
        Self::from_parts(cache, limiter)
    }

    pub fn from_parts(cache: ResponseCache, limiter: RateLimiter) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            limiter: Arc::new(RwLock::new(limiter)),
        }
    }

    /// Default tables, process-memory storage, wall clock.
    pub fn in_memory() -> Self {
        Self::new(
            CacheConfig::default(),
            RateLimitConfig::default(),
            Arc::new(MemoryStore::new()),
            Arc::new(SystemClock),
        )
    }

    /// Default tables, file storage under `config.storage_dir`, wall clock.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            CacheConfig::default(),
            RateLimitConfig::default(),
            Arc::new(FileStore::new(config.storage_dir.clone())),
            Arc::new(SystemClock),
        )
    }

    // == Call ==
    /// Runs `perform` under cache and rate-limit mediation.
    ///
    /// `key_input` is the reduced cache-key input for the call; `perform` is
    /// only invoked on a cache miss with rate-limit budget available, and
    /// spends exactly one unit of it.
    pub async fn call<T, F, Fut>(
        &self,
        call_type: CallType,
        key_input: &str,
        perform: F,
        options: CallOptions,
    ) -> Result<Mediated<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !options.skip_cache {
            let cached = self.cache.write().await.get::<T>(call_type, key_input);
            if let Some(data) = cached {
                debug!(call_type = %call_type, "Serving AI call from cache");
                return Ok(Mediated {
                    data,
                    from_cache: true,
                });
            }
        }

        if !options.skip_rate_limit {
            let mut limiter = self.limiter.write().await;
            let status = limiter.check(call_type);
            if !status.allowed || !limiter.consume(call_type) {
                warn!(
                    call_type = %call_type,
                    reset_in_ms = status.reset_in_ms,
                    "AI call rejected by rate limiter"
                );
                return Err(AiError::RateLimitExceeded {
                    reset_in_ms: status.reset_in_ms,
                });
            }
        }

        let data = perform().await?;

        if !options.skip_cache {
            self.cache.write().await.set(call_type, key_input, &data);
        }

        Ok(Mediated::fresh(data))
    }

    // == Observability ==
    /// Allowance for `call_type` without spending budget.
    pub async fn check(&self, call_type: CallType) -> RateLimitStatus {
        self.limiter.write().await.check(call_type)
    }

    pub async fn usage(&self) -> BTreeMap<RateScope, UsageSnapshot> {
        self.limiter.read().await.usage()
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    pub async fn reset_limits(&self) {
        self.limiter.write().await.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::RateLimit;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn mediator(cache: CacheConfig, limits: RateLimitConfig) -> (CallMediator, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(10_000_000));
        let mediator =
            CallMediator::new(cache, limits, Arc::new(MemoryStore::new()), clock.clone());
        (mediator, clock)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let (mediator, _) = mediator(CacheConfig::default(), RateLimitConfig::default());
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        for expected_from_cache in [false, true] {
            let result = mediator
                .call(
                    CallType::Insights,
                    "key",
                    move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, AiError>("fresh".to_string())
                    },
                    CallOptions::default(),
                )
                .await
                .unwrap();
            assert_eq!(result.data, "fresh");
            assert_eq!(result.from_cache, expected_from_cache);
        }

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(mediator.usage().await[&RateScope::Global].used, 1);
    }

    #[tokio::test]
    async fn test_rate_limited_call_is_not_performed() {
        let limits = RateLimitConfig::default()
            .with_limit(CallType::Coaching, RateLimit::new(1, 120_000));
        let (mediator, _) = mediator(CacheConfig::default(), limits);

        let counter = AtomicUsize::new(0);
        let calls = &counter;

        for input in ["a", "b"] {
            let _ = mediator
                .call(
                    CallType::Coaching,
                    input,
                    move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, AiError>(1u32)
                    },
                    CallOptions::default(),
                )
                .await;
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        let err = mediator
            .call(
                CallType::Coaching,
                "c",
                || async { Ok::<_, AiError>(2u32) },
                CallOptions::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AiError::RateLimitExceeded { reset_in_ms: 120_000 }));
        assert_eq!(err.to_string(), "Rate limit exceeded. Please try again in 2 minute(s).");
    }

    #[tokio::test]
    async fn test_failure_propagates_and_is_not_cached() {
        let (mediator, _) = mediator(CacheConfig::default(), RateLimitConfig::default());

        let err = mediator
            .call::<String, _, _>(
                CallType::Suggestions,
                "k",
                || async { Err(AiError::Provider("boom".to_string())) },
                CallOptions::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AiError::Provider(ref m) if m == "boom"));
        assert_eq!(mediator.cache_stats().await.size, 0);
        // The attempt still spent budget.
        assert_eq!(mediator.usage().await[&RateScope::Call(CallType::Suggestions)].used, 1);
    }

    #[tokio::test]
    async fn test_skip_cache_always_calls() {
        let (mediator, _) = mediator(CacheConfig::default(), RateLimitConfig::default());

        for _ in 0..2 {
            let result = mediator
                .call(
                    CallType::Coaching,
                    "k",
                    || async { Ok::<_, AiError>(7u8) },
                    CallOptions::skip_cache(),
                )
                .await
                .unwrap();
            assert!(!result.from_cache);
        }
        assert_eq!(mediator.cache_stats().await.size, 0);
        assert_eq!(mediator.usage().await[&RateScope::Global].used, 2);
    }

    #[tokio::test]
    async fn test_skip_rate_limit_spends_nothing() {
        let limits = RateLimitConfig::default().with_global(RateLimit::new(1, 60_000));
        let (mediator, _) = mediator(CacheConfig::default(), limits);

        for input in ["a", "b", "c"] {
            mediator
                .call(
                    CallType::Coaching,
                    input,
                    || async { Ok::<_, AiError>(()) },
                    CallOptions::skip_rate_limit(),
                )
                .await
                .unwrap();
        }

        assert_eq!(mediator.usage().await[&RateScope::Global].used, 0);
        assert_eq!(mediator.cache_stats().await.size, 3);
    }

    #[tokio::test]
    async fn test_clear_and_reset() {
        let (mediator, _) = mediator(CacheConfig::default(), RateLimitConfig::default());
        mediator
            .call(CallType::Coaching, "a", || async { Ok::<_, AiError>(1) }, CallOptions::default())
            .await
            .unwrap();

        mediator.clear_cache().await;
        mediator.reset_limits().await;

        assert_eq!(mediator.cache_stats().await.size, 0);
        assert_eq!(mediator.usage().await[&RateScope::Global].used, 0);
        assert!(mediator.check(CallType::Coaching).await.allowed);
    }

    #[test]
    fn test_mediated_map_keeps_flag() {
        let mediated = Mediated {
            data: 2,
            from_cache: true,
        }
        .map(|n| n * 10);
        assert_eq!(mediated, Mediated { data: 20, from_cache: true });
    }
}
