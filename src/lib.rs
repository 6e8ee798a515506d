//! AI Mediator - response cache and rate limiter for AI API calls
//!
//! Sits between application code and a remote language-model API: serves
//! repeated requests from a persisted TTL cache, bounds spend with two-tier
//! fixed-window rate limits, and answers with local fallbacks when calls are
//! denied or fail.

pub mod cache;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod limiter;
pub mod mediator;
pub mod models;
pub mod storage;
pub mod transport;

pub use client::AiClient;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, Config, RateLimit, RateLimitConfig};
pub use error::{AiError, Result, StorageError};
pub use mediator::{CallMediator, CallOptions, Mediated};
pub use models::CallType;
