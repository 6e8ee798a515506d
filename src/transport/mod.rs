//! Transport Module
//!
//! Boundary to the remote AI service. The mediator treats every method here
//! as an opaque call.

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ChatMessage, DecomposeRequest, GoalPlan, Suggestion, SuggestionRequest};

/// Remote AI operations.
#[async_trait]
pub trait AiTransport: Send + Sync {
    /// Sends a role-tagged conversation and returns the assistant's text.
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String>;

    /// Breaks a goal down into milestones.
    async fn decompose_goal(&self, request: DecomposeRequest) -> Result<GoalPlan>;

    /// Returns suggestion objects for a suggestion type and context.
    async fn suggestions(&self, request: SuggestionRequest) -> Result<Vec<Suggestion>>;
}
