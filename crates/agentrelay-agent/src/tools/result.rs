//! Tool outcomes — the structured result every tool hands back.
//!
//! Tools never raise: success and failure are both data, so the
//! orchestrator can always fold *some* outcome back into the conversation.
//!
//! Wire shape (one shape for every failure, aggregator-level or tool-level):
//! - success: `{"success": true, ...payload}`
//! - failure: `{"success": false, "error": "<Kind>", "message": "<detail>"}`

use serde_json::{Map, Value};

// ─────────────────────────────────────────────
// ToolError
// ─────────────────────────────────────────────

/// Tool-level failure taxonomy.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ToolError {
    /// Malformed or missing tool parameters.
    #[error("{0}")]
    InvalidArgument(String),

    /// No tool claims the requested name.
    #[error("{0}")]
    NotFound(String),

    /// A backend call made by the tool failed.
    #[error("{0}")]
    BackendUnavailable(String),

    /// The wrapped operation itself failed.
    #[error("{0}")]
    ToolExecutionFailed(String),
}

impl ToolError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        ToolError::InvalidArgument(msg.into())
    }

    pub fn not_found(name: &str) -> Self {
        ToolError::NotFound(format!("Tool '{name}' not found"))
    }

    pub fn execution_failed(msg: impl Into<String>) -> Self {
        ToolError::ToolExecutionFailed(msg.into())
    }

    /// Stable code placed in the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::InvalidArgument(_) => "InvalidArgument",
            ToolError::NotFound(_) => "NotFound",
            ToolError::BackendUnavailable(_) => "BackendUnavailable",
            ToolError::ToolExecutionFailed(_) => "ToolExecutionFailed",
        }
    }
}

// ─────────────────────────────────────────────
// ToolExecutionResult
// ─────────────────────────────────────────────

/// Outcome of one tool execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolExecutionResult {
    outcome: Result<Value, ToolError>,
    /// Backend tokens spent while producing this result.
    used_tokens: u64,
}

impl ToolExecutionResult {
    /// A successful result carrying `payload`.
    pub fn success(payload: Value) -> Self {
        Self {
            outcome: Ok(payload),
            used_tokens: 0,
        }
    }

    /// A failed result.
    pub fn failure(error: ToolError) -> Self {
        Self {
            outcome: Err(error),
            used_tokens: 0,
        }
    }

    /// Attach the backend cost incurred by the tool.
    pub fn with_used_tokens(mut self, tokens: u64) -> Self {
        self.used_tokens = tokens;
        self
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn payload(&self) -> Option<&Value> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ToolError> {
        self.outcome.as_ref().err()
    }

    pub fn used_tokens(&self) -> u64 {
        self.used_tokens
    }

    /// Serialize into the wire shape described in the module docs.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        match &self.outcome {
            Ok(payload) => {
                obj.insert("success".into(), Value::Bool(true));
                match payload {
                    Value::Object(fields) => {
                        for (k, v) in fields {
                            if k != "success" {
                                obj.insert(k.clone(), v.clone());
                            }
                        }
                    }
                    Value::Null => {}
                    other => {
                        obj.insert("result".into(), other.clone());
                    }
                }
            }
            Err(err) => {
                obj.insert("success".into(), Value::Bool(false));
                obj.insert("error".into(), Value::String(err.kind().to_string()));
                obj.insert("message".into(), Value::String(err.to_string()));
            }
        }
        Value::Object(obj)
    }

    /// Serialized JSON text, as folded into a tool-result message.
    pub fn to_content(&self) -> String {
        self.to_value().to_string()
    }
}

impl From<Result<Value, ToolError>> for ToolExecutionResult {
    fn from(outcome: Result<Value, ToolError>) -> Self {
        Self {
            outcome,
            used_tokens: 0,
        }
    }
}
