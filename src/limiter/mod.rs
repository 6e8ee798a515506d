//! Rate Limiter Module
//!
//! Two-tier fixed-window rate limiting: one window per call type plus a
//! global window shared by every call.

mod entry;
mod status;
mod store;


pub use entry::{RateLimitEntry, RateScope};
pub use status::{format_wait, RateLimitStatus, UsageSnapshot};
pub use store::RateLimiter;
