//! LLM Provider trait — the model backend boundary.
//!
//! The session orchestrator and the summarizing decorator only ever see this
//! trait. `HttpProvider` covers any OpenAI-compatible API; tests plug in
//! scripted mocks.

use async_trait::async_trait;
use agentrelay_core::types::{LlmResponse, Message, ToolDefinition};

use crate::error::ProviderError;

/// Configuration passed to each LLM call.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

/// Trait that all LLM backends implement.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request.
    ///
    /// # Arguments
    /// * `messages` — Conversation so far, in order.
    /// * `tools`    — Optional tool catalog the model may call.
    /// * `model`    — Model identifier.
    /// * `config`   — Temperature, max_tokens.
    ///
    /// # Returns
    /// The response (text and/or tool calls, plus token usage), or a
    /// `ProviderError` when the backend could not be reached or answered
    /// with something unusable.
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError>;

    /// The default model for this provider instance.
    fn default_model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
