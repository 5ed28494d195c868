//! LLM collaborator boundary.
//!
//! Used only for freeform query intents. Numeric totals are always computed
//! server-side before the call; the model receives them as context and is
//! never trusted to recompute them. Failure is non-fatal: the resolver
//! falls back to a deterministic canned answer.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::models::config::LlmConfig;

/// Pluggable completion collaborator.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete a question given a compact JSON context.
    async fn complete(&self, question: &str, context: &Value) -> Result<String, LlmError>;
}

/// OpenRouter-compatible chat completions client.
pub struct OpenRouterClient {
    client: reqwest::Client,
    config: LlmConfig,
    api_key: String,
}

impl OpenRouterClient {
    pub fn new(config: LlmConfig, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            api_key: api_key.into(),
        }
    }

    /// Build from the `OPENROUTER_API_KEY` environment variable.
    /// Returns `None` when the key is unset, leaving freeform queries on
    /// the deterministic fallback path.
    pub fn from_env(config: LlmConfig) -> Option<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY").ok()?;
        if api_key.is_empty() {
            return None;
        }
        Some(Self::new(config, api_key))
    }
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Context payloads are truncated to keep prompts bounded.
const MAX_CONTEXT_CHARS: usize = 4000;

#[async_trait]
impl LlmClient for OpenRouterClient {
    async fn complete(&self, question: &str, context: &Value) -> Result<String, LlmError> {
        let mut context_json = context.to_string();
        if context_json.len() > MAX_CONTEXT_CHARS {
            let mut end = MAX_CONTEXT_CHARS;
            while !context_json.is_char_boundary(end) {
                end -= 1;
            }
            context_json.truncate(end);
        }

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are an assistant for an invoice dashboard. Answer concisely \
                              using only the provided JSON context. All totals in the context \
                              are precomputed; repeat them, never recompute."
                        .to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Question: {question}\n\nContext JSON:\n{context_json}"),
                },
            ],
            temperature: 0.2,
        };

        let response = self
            .client
            .post(&self.config.base_url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_millis(self.config.timeout_ms))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.config.timeout_ms)
                } else {
                    LlmError::Request(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "LLM request rejected");
            return Err(LlmError::Request(format!("{status}: {body}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Response(e.to_string()))?;

        let answer = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LlmError::Response("empty completion".to_string()))?;

        debug!(answer_len = answer.len(), "LLM completion received");
        Ok(answer)
    }
}
