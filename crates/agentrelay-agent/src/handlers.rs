//! Transport-facing handlers — turn an inbound dispatch into one session.
//!
//! [`MessageHandler`] takes a conversation history, [`TriggerHandler`] takes a
//! single event. Both run the shared orchestrator once and answer with a
//! [`DispatchResponse`]. Neither keeps anything between calls.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use agentrelay_core::types::Message;
use agentrelay_core::AgentError;

use crate::memory::MemoryBackend;
use crate::orchestrator::{
    ExternalToolExecutor, SessionOrchestrator, SessionOutcome, SessionRequest, SessionStatus,
};
use crate::tools::base::Tool;
use crate::tools::memory::memory_tools;
use crate::tools::summarize::summarized_variants;

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

/// One entry of an inbound conversation history.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InboundMessage {
    pub role: String,
    pub content: String,
}

impl InboundMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    fn into_message(self) -> Result<Message, AgentError> {
        match self.role.as_str() {
            "system" => Ok(Message::system(self.content)),
            "user" => Ok(Message::user(self.content)),
            "assistant" => Ok(Message::assistant(self.content)),
            other => Err(AgentError::InvalidRequest(format!("unsupported role '{other}'"))),
        }
    }
}

/// A named event that opens a session on its own.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TriggerEvent {
    pub name: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl TriggerEvent {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
            timestamp: None,
        }
    }

    /// Opening user message describing the event.
    pub fn to_message(&self) -> Message {
        let at = self.timestamp.unwrap_or_else(Utc::now).to_rfc3339();
        let payload = match &self.payload {
            Value::Null => "(none)".to_string(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        };
        Message::user(format!(
            "Trigger `{}` fired at {at}.\n\nPayload:\n{payload}",
            self.name
        ))
    }
}

/// The answer sent back to the transport.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    #[serde(rename = "type")]
    pub response_type: String,
    pub content: String,
    pub used_token: u64,
    /// In-process view of how the session ended.
    #[serde(skip)]
    pub status: SessionStatus,
}

impl DispatchResponse {
    fn from_outcome(outcome: SessionOutcome) -> Self {
        Self {
            response_type: "text".into(),
            content: outcome.content,
            used_token: outcome.used_tokens,
            status: outcome.status,
        }
    }

    /// A response for a dispatch that never reached the backend.
    fn rejected(reason: AgentError) -> Self {
        Self {
            response_type: "text".into(),
            content: reason.to_string(),
            used_token: 0,
            status: SessionStatus::Aborted(reason),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_done()
    }
}

// ─────────────────────────────────────────────
// HandlerContext
// ─────────────────────────────────────────────

/// Per-dispatch collaborators supplied by the transport.
#[derive(Clone, Default)]
pub struct HandlerContext {
    /// Memory store handle; enables the `agentmemory_*` tools for this dispatch.
    pub memory: Option<Arc<dyn MemoryBackend>>,
    pub external: Option<Arc<dyn ExternalToolExecutor>>,
    pub cancel: CancellationToken,
}

impl HandlerContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_memory(mut self, memory: Arc<dyn MemoryBackend>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_external(mut self, external: Arc<dyn ExternalToolExecutor>) -> Self {
        self.external = Some(external);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Memory tools for one dispatch, plus their summarized variants when enabled.
fn dispatch_memory_tools(orchestrator: &SessionOrchestrator, memory: Arc<dyn MemoryBackend>) -> Vec<Arc<dyn Tool>> {
    let mut tools = memory_tools(memory);
    let settings = orchestrator.settings();
    if settings.summarize_tools {
        let summarized = summarized_variants(
            &tools,
            orchestrator.provider(),
            &settings.model,
            &settings.request_config,
        );
        tools.extend(summarized);
    }
    tools
}

/// Run one session for `messages` under `ctx`.
async fn dispatch(
    orchestrator: &SessionOrchestrator,
    messages: Vec<Message>,
    ctx: HandlerContext,
) -> DispatchResponse {
    let mut request = SessionRequest::new(messages).with_cancellation(ctx.cancel);

    if let Some(memory) = ctx.memory {
        match orchestrator.tools().with_tools(dispatch_memory_tools(orchestrator, memory)) {
            Ok(tools) => request = request.with_tools(tools),
            Err(e) => {
                error!(error = %e, "cannot bind memory tools for this dispatch");
                return DispatchResponse::rejected(AgentError::InvalidRequest(e.to_string()));
            }
        }
    }
    if let Some(external) = ctx.external {
        request = request.with_external(external);
    }

    let response = DispatchResponse::from_outcome(orchestrator.run(request).await);
    info!(
        status = response.status.kind(),
        used_token = response.used_token,
        "dispatch finished"
    );
    response
}

// ─────────────────────────────────────────────
// MessageHandler
// ─────────────────────────────────────────────

/// Answers a conversation history.
#[derive(Clone)]
pub struct MessageHandler {
    orchestrator: Arc<SessionOrchestrator>,
}

impl MessageHandler {
    pub fn new(orchestrator: Arc<SessionOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn handle(&self, history: Vec<InboundMessage>, ctx: HandlerContext) -> DispatchResponse {
        if history.is_empty() {
            error!("message dispatch with empty history rejected");
            return DispatchResponse::rejected(AgentError::InvalidRequest(
                "message history is empty".into(),
            ));
        }

        let messages = match history
            .into_iter()
            .map(InboundMessage::into_message)
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(m) => m,
            Err(e) => {
                error!(error = %e, "message dispatch rejected");
                return DispatchResponse::rejected(e);
            }
        };

        dispatch(&self.orchestrator, messages, ctx).await
    }
}

// ─────────────────────────────────────────────
// TriggerHandler
// ─────────────────────────────────────────────

/// Answers a single trigger event.
#[derive(Clone)]
pub struct TriggerHandler {
    orchestrator: Arc<SessionOrchestrator>,
}

impl TriggerHandler {
    pub fn new(orchestrator: Arc<SessionOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn handle(&self, event: TriggerEvent, ctx: HandlerContext) -> DispatchResponse {
        if event.name.trim().is_empty() {
            error!("trigger dispatch without a name rejected");
            return DispatchResponse::rejected(AgentError::InvalidRequest(
                "trigger name is empty".into(),
            ));
        }
        info!(trigger = %event.name, "handling trigger");
        dispatch(&self.orchestrator, vec![event.to_message()], ctx).await
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
