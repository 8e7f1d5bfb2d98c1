//! Agentrelay Agent — tools, session orchestration and dispatch handlers.
//!
//! This crate contains:
//! - **tools**: Tool trait, structured results, aggregator, summarizing decorator, memory tools
//! - **memory**: the memory store collaborator interface
//! - **context**: per-session conversation state
//! - **orchestrator**: the LLM ↔ tool-calling state machine
//! - **handlers**: message and trigger entry points for transports
//! - **logger**: injected session event sink

pub mod context;
pub mod handlers;
pub mod logger;
pub mod memory;
pub mod orchestrator;
pub mod tools;

#[cfg(test)]
mod testing;

pub use handlers::{DispatchResponse, HandlerContext, InboundMessage, MessageHandler, TriggerEvent, TriggerHandler};
pub use logger::{NoopLogger, SessionEvent, SessionLogger, TracingLogger};
pub use memory::MemoryBackend;
pub use orchestrator::{
    ExternalToolExecutor, OrchestratorSettings, SessionOrchestrator, SessionOutcome, SessionRequest, SessionStatus,
};
pub use tools::{SummarizingTool, Tool, ToolAggregator, ToolError, ToolExecutionResult};
