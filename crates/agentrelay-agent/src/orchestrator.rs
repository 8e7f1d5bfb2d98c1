//! Session orchestrator — the LLM ↔ tool-calling loop for one dispatch.
//!
//! Drives a session through explicit phases:
//!
//! ```text
//! AwaitingModel ──text──▶ Done
//!      │  ▲
//! calls│  │round complete
//!      ▼  │
//! ExecutingTools ──ceiling──▶ Aborted
//! ```
//!
//! A backend failure or cancellation also ends in `Aborted`. The orchestrator
//! itself is stateless between runs; every run owns a fresh [`SessionState`].

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use agentrelay_core::config::AgentDefaults;
use agentrelay_core::types::{Message, ToolCall, ToolDefinition};
use agentrelay_core::AgentError;
use agentrelay_providers::traits::{LlmProvider, LlmRequestConfig};

use crate::context::{merge_catalog, SessionState};
use crate::logger::{NoopLogger, SessionEvent, SessionLogger};
use crate::tools::base::ToolParams;
use crate::tools::registry::ToolAggregator;
use crate::tools::result::{ToolError, ToolExecutionResult};

// ─────────────────────────────────────────────
// External executor
// ─────────────────────────────────────────────

/// Tools supplied by the caller rather than registered at startup.
#[async_trait]
pub trait ExternalToolExecutor: Send + Sync {
    /// Definitions advertised to the model alongside the internal catalog.
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Execute `name`, or return `None` if this executor does not handle it.
    async fn execute(&self, name: &str, params: ToolParams) -> Option<ToolExecutionResult>;
}

// ─────────────────────────────────────────────
// Settings, request and outcome
// ─────────────────────────────────────────────

/// Per-orchestrator settings.
#[derive(Clone, Debug)]
pub struct OrchestratorSettings {
    pub model: String,
    pub request_config: LlmRequestConfig,
    /// Tool round-trips allowed before the session aborts.
    pub max_tool_iterations: u32,
    pub parallel_tool_calls: bool,
    /// Offer summarized variants of per-dispatch tools.
    pub summarize_tools: bool,
    pub system_prompt: Option<String>,
}

impl OrchestratorSettings {
    pub fn from_defaults(defaults: &AgentDefaults) -> Self {
        Self {
            model: defaults.model.clone(),
            request_config: LlmRequestConfig {
                max_tokens: defaults.max_tokens,
                temperature: defaults.temperature,
            },
            max_tool_iterations: defaults.iteration_ceiling(),
            parallel_tool_calls: defaults.parallel_tool_calls,
            summarize_tools: defaults.summarize_tools,
            system_prompt: defaults.system_prompt.clone(),
        }
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from_defaults(&AgentDefaults::default())
    }
}

/// Input for one run.
pub struct SessionRequest {
    messages: Vec<Message>,
    tools: Option<ToolAggregator>,
    external: Option<Arc<dyn ExternalToolExecutor>>,
    cancel: CancellationToken,
}

impl SessionRequest {
    /// A run over `messages` using the orchestrator's shared tools.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: None,
            external: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Use a session-local aggregator instead of the shared one.
    pub fn with_tools(mut self, tools: ToolAggregator) -> Self {
        self.tools = Some(tools);
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

/// How a session ended.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionStatus {
    Done,
    Aborted(AgentError),
}

impl SessionStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, SessionStatus::Done)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SessionStatus::Done => "Done",
            SessionStatus::Aborted(reason) => reason.kind(),
        }
    }
}

/// Terminal result of a run.
#[derive(Clone, Debug)]
pub struct SessionOutcome {
    pub status: SessionStatus,
    /// Final answer, or the best available explanation when aborted.
    pub content: String,
    /// Every token billed during the session, including tool-side calls.
    pub used_tokens: u64,
    /// Completed tool round-trips.
    pub iterations: u32,
    /// Full transcript.
    pub messages: Vec<Message>,
}

// ─────────────────────────────────────────────
// Phases
// ─────────────────────────────────────────────

enum Phase {
    AwaitingModel,
    ExecutingTools(Vec<ToolCall>),
    Done(String),
    Aborted(AgentError),
}

/// Collaborators borrowed for the duration of one run.
struct Run<'a> {
    tools: &'a ToolAggregator,
    external: Option<&'a dyn ExternalToolExecutor>,
    cancel: &'a CancellationToken,
}

// ─────────────────────────────────────────────
// SessionOrchestrator
// ─────────────────────────────────────────────

/// Runs sessions against one model backend and one shared tool aggregator.
///
/// Shared across concurrent dispatches; nothing here is mutated by a run.
pub struct SessionOrchestrator {
    provider: Arc<dyn LlmProvider>,
    tools: ToolAggregator,
    settings: OrchestratorSettings,
    logger: Arc<dyn SessionLogger>,
}

impl SessionOrchestrator {
    pub fn new(provider: Arc<dyn LlmProvider>, tools: ToolAggregator, settings: OrchestratorSettings) -> Self {
        Self {
            provider,
            tools,
            settings,
            logger: Arc::new(NoopLogger),
        }
    }

    /// Replace the default [`NoopLogger`].
    pub fn with_logger(mut self, logger: Arc<dyn SessionLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// The model backend, shared with tools that make their own calls.
    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    /// The shared aggregator, for deriving session-local ones.
    pub fn tools(&self) -> &ToolAggregator {
        &self.tools
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Run one session to completion.
    pub async fn run(&self, request: SessionRequest) -> SessionOutcome {
        let SessionRequest {
            messages,
            tools,
            external,
            cancel,
        } = request;

        let run = Run {
            tools: tools.as_ref().unwrap_or(&self.tools),
            external: external.as_deref(),
            cancel: &cancel,
        };

        let external_defs = run.external.map(|e| e.definitions()).unwrap_or_default();
        let (catalog, shadowed) = merge_catalog(run.tools.list_definitions(), external_defs);
        for def in &shadowed {
            self.logger.log(&SessionEvent::ToolShadowed { tool: def.name() });
        }

        let mut state = SessionState::new(self.settings.system_prompt.as_deref(), messages, catalog);
        self.logger.log(&SessionEvent::Started {
            messages: state.messages().len(),
            tools: state.tools().len(),
        });

        let ceiling = self.settings.max_tool_iterations.max(1);
        let mut phase = Phase::AwaitingModel;
        loop {
            phase = match phase {
                Phase::AwaitingModel => self.await_model(&mut state, &run).await,
                Phase::ExecutingTools(calls) => {
                    if let Err(reason) = self.execute_tools(&mut state, &run, calls).await {
                        Phase::Aborted(reason)
                    } else {
                        state.complete_iteration();
                        if state.iteration() >= ceiling {
                            Phase::Aborted(AgentError::IterationLimitExceeded { limit: ceiling })
                        } else {
                            Phase::AwaitingModel
                        }
                    }
                }
                Phase::Done(content) => return self.finish(state, SessionStatus::Done, content),
                Phase::Aborted(reason) => {
                    let content = match &reason {
                        AgentError::IterationLimitExceeded { limit } => state
                            .last_assistant_text()
                            .map(str::to_string)
                            .unwrap_or_else(|| {
                                format!("Stopped after {limit} tool iterations without a final answer.")
                            }),
                        other => other.to_string(),
                    };
                    return self.finish(state, SessionStatus::Aborted(reason), content);
                }
            };
        }
    }

    /// One backend call. The in-flight call is dropped on cancellation.
    async fn await_model(&self, state: &mut SessionState, run: &Run<'_>) -> Phase {
        if run.cancel.is_cancelled() {
            return Phase::Aborted(AgentError::Cancelled);
        }

        let tools = (!state.tools().is_empty()).then(|| state.tools());
        let result = tokio::select! {
            biased;
            _ = run.cancel.cancelled() => return Phase::Aborted(AgentError::Cancelled),
            result = self.provider.chat(
                state.messages(),
                tools,
                &self.settings.model,
                &self.settings.request_config,
            ) => result,
        };

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(
                    provider = self.provider.display_name(),
                    iteration = state.iteration(),
                    error = %e,
                    "backend call failed"
                );
                return Phase::Aborted(AgentError::BackendUnavailable(e.to_string()));
            }
        };

        let cost = response.token_cost();
        state.add_tokens(cost);
        self.logger.log(&SessionEvent::ModelResponded {
            iteration: state.iteration(),
            tool_calls: response.tool_calls.len(),
            used_tokens: cost,
        });

        if response.has_tool_calls() {
            let calls = response.tool_calls;
            state.push_tool_calls(response.content, calls.clone());
            Phase::ExecutingTools(calls)
        } else {
            Phase::Done(response.content.unwrap_or_default())
        }
    }

    /// Resolve every call of one round and fold the results in request order.
    ///
    /// On cancellation no further call is started, but results already
    /// produced are still folded in and their tokens counted.
    async fn execute_tools(
        &self,
        state: &mut SessionState,
        run: &Run<'_>,
        calls: Vec<ToolCall>,
    ) -> Result<(), AgentError> {
        if run.cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }

        let results: Vec<ToolExecutionResult> = if self.settings.parallel_tool_calls {
            join_all(calls.iter().map(|call| dispatch_call(run, call))).await
        } else {
            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                if run.cancel.is_cancelled() {
                    debug!(
                        completed = results.len(),
                        skipped = calls.len() - results.len(),
                        "round cancelled"
                    );
                    break;
                }
                results.push(dispatch_call(run, call).await);
            }
            results
        };

        self.fold_results(state, &calls, &results);
        if results.len() < calls.len() {
            return Err(AgentError::Cancelled);
        }
        Ok(())
    }

    fn fold_results(&self, state: &mut SessionState, calls: &[ToolCall], results: &[ToolExecutionResult]) {
        for (call, result) in calls.iter().zip(results) {
            state.add_tokens(result.used_tokens());
            self.logger.log(&SessionEvent::ToolFinished {
                iteration: state.iteration(),
                tool: call.name(),
                success: result.is_success(),
                used_tokens: result.used_tokens(),
            });
            state.push_tool_result(&call.id, result);
        }
    }

    fn finish(&self, mut state: SessionState, status: SessionStatus, content: String) -> SessionOutcome {
        if status.is_done() {
            state.push_answer(&content);
        }
        let used_tokens = state.total_used_tokens();
        let iterations = state.iteration();
        self.logger.log(&SessionEvent::Finished {
            status: &status,
            iterations,
            used_tokens,
        });

        SessionOutcome {
            status,
            content,
            used_tokens,
            iterations,
            messages: state.into_messages(),
        }
    }
}

/// Route one call: internal aggregator, then the external executor, else `NotFound`.
async fn dispatch_call(run: &Run<'_>, call: &ToolCall) -> ToolExecutionResult {
    let name = call.name();
    let params: ToolParams = match call.parse_arguments() {
        Ok(map) => map.into_iter().collect(),
        Err(e) => {
            warn!(tool = name, call_id = %call.id, "undecodable tool arguments");
            return ToolExecutionResult::failure(ToolError::invalid_argument(e));
        }
    };

    if run.tools.can_handle(name) {
        return run.tools.execute(name, params).await;
    }
    if let Some(external) = run.external {
        if let Some(result) = external.execute(name, params).await {
            debug!(tool = name, "handled by external executor");
            return result;
        }
    }
    warn!(tool = name, "no executor claims tool");
    ToolExecutionResult::failure(ToolError::not_found(name))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
