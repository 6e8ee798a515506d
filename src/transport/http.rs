//! HTTP transport against the AI service's JSON endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{AiError, Result};
use crate::models::{
    ChatMessage, ChatReply, ChatRequest, DecomposeReply, DecomposeRequest, GoalPlan, Suggestion,
    SuggestionRequest, SuggestionsReply,
};
use crate::transport::AiTransport;

const CHAT_PATH: &str = "/api/ai/chat";
const DECOMPOSE_PATH: &str = "/api/ai/decompose";
const SUGGESTIONS_PATH: &str = "/api/ai/suggestions";

/// [`AiTransport`] that POSTs JSON to `{base_url}/api/ai/*`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "POST to AI service");

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AiError::Provider(format!("{} returned {}: {}", path, status, text)));
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| AiError::MalformedResponse(format!("{}: {}", path, e)))
    }
}

fn provider_error(error: Option<String>, fallback: &str) -> AiError {
    AiError::Provider(error.unwrap_or_else(|| fallback.to_string()))
}

#[async_trait]
impl AiTransport for HttpTransport {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let reply: ChatReply = self.post(CHAT_PATH, &ChatRequest { messages }).await?;
        if !reply.success {
            return Err(provider_error(reply.error, "chat request failed"));
        }
        if let Some(provider) = &reply.provider {
            debug!(provider = %provider, "Chat answered");
        }
        Ok(reply.message)
    }

    async fn decompose_goal(&self, request: DecomposeRequest) -> Result<GoalPlan> {
        let reply: DecomposeReply = self.post(DECOMPOSE_PATH, &request).await?;
        if !reply.success {
            return Err(provider_error(reply.error, "goal decomposition failed"));
        }
        Ok(GoalPlan {
            milestones: reply.milestones,
        })
    }

    async fn suggestions(&self, request: SuggestionRequest) -> Result<Vec<Suggestion>> {
        let reply: SuggestionsReply = self.post(SUGGESTIONS_PATH, &request).await?;
        if !reply.success {
            return Err(provider_error(reply.error, "suggestion request failed"));
        }
        Ok(reply.suggestions)
    }
}
