//! Typed Client Module
//!
//! Domain wrappers over the [`CallMediator`]. Each wrapper reduces its
//! context to a coarse cache-key signature, so near-identical situations
//! share one cache entry, and answers with a deterministic local fallback
//! whenever the mediated call fails, rate limiting included.

mod coaching;
mod decomposition;
mod extract;
mod insights;
mod suggestions;

pub use coaching::{CoachingContext, CoachingKind, CoachingMessage, TimeOfDay, Trend};
pub use extract::extract_json_object;
pub use insights::{InsightContext, InsightKind, PatternInsight};
pub use suggestions::SuggestionContext;

use std::sync::Arc;

use crate::config::Config;
use crate::mediator::CallMediator;
use crate::transport::{AiTransport, HttpTransport};

// == AI Client ==
/// Domain-level entry point for AI features.
#[derive(Clone)]
pub struct AiClient {
    mediator: CallMediator,
    transport: Arc<dyn AiTransport>,
}

impl AiClient {
    pub fn new(mediator: CallMediator, transport: Arc<dyn AiTransport>) -> Self {
        Self {
            mediator,
            transport,
        }
    }

    /// File-backed mediator and HTTP transport, both from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            CallMediator::from_config(config),
            Arc::new(HttpTransport::from_config(config)),
        )
    }

    pub fn mediator(&self) -> &CallMediator {
        &self.mediator
    }
}

/// Buckets a completion ratio into deciles 0..=10. Out-of-range and NaN
/// inputs are clamped.
pub fn completion_decile(rate: f64) -> u8 {
    if rate.is_nan() {
        return 0;
    }
    (rate.clamp(0.0, 1.0) * 10.0).floor() as u8
}

/// Lower-cases, trims and collapses internal whitespace.
pub(crate) fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_decile() {
        assert_eq!(completion_decile(0.0), 0);
        assert_eq!(completion_decile(0.09), 0);
        assert_eq!(completion_decile(0.7), 7);
        assert_eq!(completion_decile(0.79), 7);
        assert_eq!(completion_decile(1.0), 10);
        assert_eq!(completion_decile(1.7), 10);
        assert_eq!(completion_decile(-0.2), 0);
        assert_eq!(completion_decile(f64::NAN), 0);
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Run   a\tMarathon "), "run a marathon");
    }
}
