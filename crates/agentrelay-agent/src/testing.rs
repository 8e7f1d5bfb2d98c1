//! Scripted collaborators shared by the unit tests of this crate.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use agentrelay_core::types::{LlmResponse, Message, ToolCall, ToolDefinition};
use agentrelay_providers::traits::{LlmProvider, LlmRequestConfig};
use agentrelay_providers::ProviderError;

use crate::logger::{SessionEvent, SessionLogger};
use crate::tools::base::{Tool, ToolParams};
use crate::tools::result::ToolExecutionResult;

/// Replays a fixed script of responses, then repeats `fallback` forever.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<LlmResponse, ProviderError>>>,
    fallback: Option<LlmResponse>,
    calls: AtomicUsize,
    seen: Mutex<Vec<Vec<Message>>>,
    seen_tools: Mutex<Vec<Vec<String>>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<LlmResponse, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            seen_tools: Mutex::new(Vec::new()),
        })
    }

    pub fn repeating(response: LlmResponse) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(response),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            seen_tools: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Messages sent with the n-th call.
    pub fn request(&self, n: usize) -> Vec<Message> {
        self.seen.lock().unwrap()[n].clone()
    }

    /// Tool names advertised with the n-th call.
    pub fn advertised(&self, n: usize) -> Vec<String> {
        self.seen_tools.lock().unwrap()[n].clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        _model: &str,
        _config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(messages.to_vec());
        self.seen_tools.lock().unwrap().push(
            tools
                .unwrap_or_default()
                .iter()
                .map(|d| d.name().to_string())
                .collect(),
        );
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        match &self.fallback {
            Some(response) => Ok(response.clone()),
            None => Err(ProviderError::Client("script exhausted".into())),
        }
    }

    fn default_model(&self) -> &str {
        "scripted"
    }

    fn display_name(&self) -> &str {
        "ScriptedProvider"
    }
}

/// Never answers; used to observe abandonment of in-flight calls.
pub struct HangingProvider;

#[async_trait]
impl LlmProvider for HangingProvider {
    async fn chat(
        &self,
        _messages: &[Message],
        _tools: Option<&[ToolDefinition]>,
        _model: &str,
        _config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError> {
        std::future::pending().await
    }

    fn default_model(&self) -> &str {
        "hanging"
    }

    fn display_name(&self) -> &str {
        "HangingProvider"
    }
}

/// Echoes its arguments after an optional delay and counts calls.
pub struct EchoTool {
    name: &'static str,
    delay: Duration,
    calls: AtomicUsize,
}

impl EchoTool {
    pub fn new(name: &'static str) -> Arc<Self> {
        Self::delayed(name, 0)
    }

    pub fn delayed(name: &'static str, millis: u64) -> Arc<Self> {
        Arc::new(Self {
            name,
            delay: Duration::from_millis(millis),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Echoes its arguments"
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}, "required": []})
    }

    async fn execute(&self, params: ToolParams) -> ToolExecutionResult {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        ToolExecutionResult::success(json!({ "tool": self.name, "args": params }))
    }
}

/// Keeps a line per event.
#[derive(Default)]
pub struct RecordingLogger {
    lines: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl SessionLogger for RecordingLogger {
    fn log(&self, event: &SessionEvent<'_>) {
        let line = match event {
            SessionEvent::Started { .. } => "started".to_string(),
            SessionEvent::ModelResponded { iteration, .. } => format!("model:{iteration}"),
            SessionEvent::ToolFinished { tool, success, .. } => format!("tool:{tool}:{success}"),
            SessionEvent::ToolShadowed { tool } => format!("shadowed:{tool}"),
            SessionEvent::Finished { status, .. } => format!("finished:{}", status.kind()),
        };
        self.lines.lock().unwrap().push(line);
    }
}

pub fn call(id: &str, name: &str, arguments: &str) -> ToolCall {
    ToolCall::new(id, name, arguments)
}

/// Content of every tool-result message, parsed, with its call id.
pub fn tool_results(messages: &[Message]) -> Vec<(String, Value)> {
    messages
        .iter()
        .filter_map(|m| match m {
            Message::Tool {
                content,
                tool_call_id,
            } => Some((tool_call_id.clone(), serde_json::from_str(content).unwrap())),
            _ => None,
        })
        .collect()
}
