//! Session-level error taxonomy.
//!
//! Tool-level failures never appear here: they are folded back into the
//! conversation as data. These are the faults that end a session early and
//! surface to the dispatch caller.

/// A fault that terminates a session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AgentError {
    #[error("model backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("iteration limit of {limit} exceeded")]
    IterationLimitExceeded { limit: u32 },

    #[error("session cancelled")]
    Cancelled,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl AgentError {
    /// Stable code for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::BackendUnavailable(_) => "BackendUnavailable",
            AgentError::IterationLimitExceeded { .. } => "IterationLimitExceeded",
            AgentError::Cancelled => "Cancelled",
            AgentError::InvalidRequest(_) => "InvalidRequest",
        }
    }
}
