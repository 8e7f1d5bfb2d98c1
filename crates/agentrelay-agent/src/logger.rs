//! Session logging — the event sink the orchestrator reports to.
//!
//! The orchestrator never decides where its session log goes. Composition
//! injects a [`SessionLogger`]: [`NoopLogger`] to stay silent, or
//! [`TracingLogger`] to forward events to `tracing`.

use tracing::{debug, info, warn};

use crate::orchestrator::SessionStatus;

/// One notable step of a session.
#[derive(Debug)]
pub enum SessionEvent<'a> {
    Started {
        messages: usize,
        tools: usize,
    },
    ModelResponded {
        iteration: u32,
        tool_calls: usize,
        used_tokens: u64,
    },
    ToolFinished {
        iteration: u32,
        tool: &'a str,
        success: bool,
        used_tokens: u64,
    },
    /// An external definition lost to an internal tool with the same name.
    ToolShadowed {
        tool: &'a str,
    },
    Finished {
        status: &'a SessionStatus,
        iterations: u32,
        used_tokens: u64,
    },
}

/// Receives session events.
pub trait SessionLogger: Send + Sync {
    fn log(&self, event: &SessionEvent<'_>);
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopLogger;

impl SessionLogger for NoopLogger {
    fn log(&self, _event: &SessionEvent<'_>) {}
}

/// Forwards events to `tracing` with structured fields.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl SessionLogger for TracingLogger {
    fn log(&self, event: &SessionEvent<'_>) {
        match event {
            SessionEvent::Started { messages, tools } => {
                info!(messages, tools, "session started");
            }
            SessionEvent::ModelResponded {
                iteration,
                tool_calls,
                used_tokens,
            } => {
                debug!(iteration, tool_calls, used_tokens, "model responded");
            }
            SessionEvent::ToolFinished {
                iteration,
                tool,
                success,
                used_tokens,
            } => {
                if *success {
                    debug!(iteration, tool = %tool, used_tokens, "tool finished");
                } else {
                    warn!(iteration, tool = %tool, "tool returned a failure result");
                }
            }
            SessionEvent::ToolShadowed { tool } => {
                warn!(tool = %tool, "external tool definition shadowed by internal tool");
            }
            SessionEvent::Finished {
                status,
                iterations,
                used_tokens,
            } => match status {
                SessionStatus::Done => {
                    info!(iterations, used_tokens, "session done");
                }
                SessionStatus::Aborted(reason) => {
                    warn!(iterations, used_tokens, kind = reason.kind(), reason = %reason, "session aborted");
                }
            },
        }
    }
}
