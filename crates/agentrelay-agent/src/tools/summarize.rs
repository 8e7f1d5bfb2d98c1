//! Summarizing decorator — wraps any tool and compresses its output with
//! one extra model call.
//!
//! The decorated tool is advertised as `<inner>_summarized` and takes one
//! additional required parameter, `summarization_instructions`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use agentrelay_core::types::Message;
use agentrelay_providers::traits::{LlmProvider, LlmRequestConfig};

use super::base::{Tool, ToolParams};
use super::result::{ToolError, ToolExecutionResult};

/// Name of the extra parameter carrying the caller's instructions.
pub const INSTRUCTIONS_PARAM: &str = "summarization_instructions";

const NAME_SUFFIX: &str = "_summarized";

const SUMMARIZER_PROMPT: &str = "You condense raw tool output. Follow the caller's \
instructions exactly and answer with the summary text only.";

// ─────────────────────────────────────────────
// SummarizingTool
// ─────────────────────────────────────────────

/// Decorator that runs the wrapped tool, then summarizes its output.
pub struct SummarizingTool {
    inner: Arc<dyn Tool>,
    provider: Arc<dyn LlmProvider>,
    model: String,
    request_config: LlmRequestConfig,
    name: String,
    description: String,
}

impl SummarizingTool {
    /// Wrap `inner`, summarizing with `provider` / `model`.
    pub fn new(
        inner: Arc<dyn Tool>,
        provider: Arc<dyn LlmProvider>,
        model: impl Into<String>,
        request_config: LlmRequestConfig,
    ) -> Self {
        let name = format!("{}{NAME_SUFFIX}", inner.name());
        let description = format!(
            "{} The raw output is summarized according to `{INSTRUCTIONS_PARAM}`.",
            inner.description()
        );
        Self {
            inner,
            provider,
            model: model.into(),
            request_config,
            name,
            description,
        }
    }

    /// Extract and validate the instructions, leaving the rest for the inner tool.
    fn split_instructions(mut params: ToolParams) -> Result<(String, ToolParams), ToolError> {
        let instructions = match params.remove(INSTRUCTIONS_PARAM) {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            Some(Value::String(_)) => {
                return Err(ToolError::invalid_argument(format!("{INSTRUCTIONS_PARAM} must not be blank")))
            }
            Some(_) => {
                return Err(ToolError::invalid_argument(format!("{INSTRUCTIONS_PARAM} must be a string")))
            }
            None => {
                return Err(ToolError::invalid_argument(format!(
                    "Missing required parameter: {INSTRUCTIONS_PARAM}"
                )))
            }
        };
        Ok((instructions, params))
    }
}

#[async_trait]
impl Tool for SummarizingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Value {
        let mut schema = self.inner.parameters();
        if !schema.is_object() {
            schema = json!({"type": "object"});
        }
        if !schema["properties"].is_object() {
            schema["properties"] = json!({});
        }
        schema["properties"][INSTRUCTIONS_PARAM] = json!({
            "type": "string",
            "description": "How to summarize the raw tool output"
        });

        let mut required: Vec<Value> = schema["required"].as_array().cloned().unwrap_or_default();
        if !required.iter().any(|r| r == INSTRUCTIONS_PARAM) {
            required.push(Value::String(INSTRUCTIONS_PARAM.to_string()));
        }
        schema["required"] = Value::Array(required);
        schema
    }

    async fn execute(&self, params: ToolParams) -> ToolExecutionResult {
        let (instructions, inner_params) = match Self::split_instructions(params) {
            Ok(split) => split,
            Err(e) => return ToolExecutionResult::failure(e),
        };

        let raw = self.inner.execute(inner_params).await;
        let raw_value = raw.to_value();
        debug!(
            tool = %self.name,
            inner_success = raw.is_success(),
            "summarizing tool output"
        );

        let messages = vec![
            Message::system(SUMMARIZER_PROMPT),
            Message::user(format!(
                "Instructions:\n{instructions}\n\nRaw output of `{}`:\n{raw_value}",
                self.inner.name()
            )),
        ];

        let response = match self
            .provider
            .chat(&messages, None, &self.model, &self.request_config)
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(tool = %self.name, error = %e, "summarization call failed");
                return ToolExecutionResult::failure(ToolError::BackendUnavailable(format!(
                    "Summarization failed: {e}. Raw output of `{}`: {raw_value}",
                    self.inner.name()
                )));
            }
        };

        let cost = response.token_cost();
        let summary = response.content.unwrap_or_default();

        ToolExecutionResult::success(json!({
            "raw": raw_value,
            "summary": summary,
            "usedToken": cost,
        }))
        .with_used_tokens(cost)
    }
}

/// One `<name>_summarized` wrapper per tool in `tools`, all sharing `provider`.
pub fn summarized_variants(
    tools: &[Arc<dyn Tool>],
    provider: &Arc<dyn LlmProvider>,
    model: &str,
    request_config: &LlmRequestConfig,
) -> Vec<Arc<dyn Tool>> {
    tools
        .iter()
        .map(|tool| {
            Arc::new(SummarizingTool::new(
                tool.clone(),
                provider.clone(),
                model,
                request_config.clone(),
            )) as Arc<dyn Tool>
        })
        .collect()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
