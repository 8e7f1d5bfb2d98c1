//! Configuration schema.
//!
//! Hierarchy: `Config` → `AgentDefaults`, `ProviderConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.agentrelay/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agent: AgentDefaults,
    pub provider: ProviderConfig,
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// Session orchestration settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentDefaults {
    /// Model identifier sent with every backend call.
    pub model: String,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Iteration ceiling: tool round-trips allowed before the session aborts.
    pub max_tool_iterations: u32,
    /// Run the tool calls of one turn concurrently.
    pub parallel_tool_calls: bool,
    /// Also offer a `<tool>_summarized` variant of every per-dispatch tool.
    pub summarize_tools: bool,
    /// Optional system prompt prepended to every session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            max_tool_iterations: 10,
            parallel_tool_calls: false,
            summarize_tools: false,
            system_prompt: None,
        }
    }
}

impl AgentDefaults {
    /// Iteration ceiling, never below one.
    pub fn iteration_ceiling(&self) -> u32 {
        self.max_tool_iterations.max(1)
    }
}

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// Connection settings for the OpenAI-compatible model backend.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for bearer authentication.
    #[serde(default)]
    pub api_key: String,
    /// Custom API base URL (defaults to the OpenAI endpoint).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ProviderConfig {
    /// Whether an API key has been configured.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}
