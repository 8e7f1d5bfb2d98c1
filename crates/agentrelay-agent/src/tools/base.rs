//! Tool trait — the capability interface every internal tool implements.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use agentrelay_core::types::ToolDefinition;

use super::result::{ToolError, ToolExecutionResult};

/// Decoded tool-call arguments.
pub type ToolParams = HashMap<String, Value>;

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every internal tool implements this trait.
///
/// The aggregator discovers tools via `name()`, advertises their schemas
/// via `to_definition()`, and dispatches calls via `execute()`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used by the LLM to call this tool (e.g. `"agentmemory_recall"`).
    fn name(&self) -> &str;

    /// Human-readable description shown to the LLM.
    fn description(&self) -> &str;

    /// JSON Schema describing the parameters.
    ///
    /// Must be `{"type": "object", "properties": {...}, "required": [...]}`.
    fn parameters(&self) -> Value;

    /// Execute the tool with the given arguments.
    ///
    /// Failures are returned as data, never raised.
    async fn execute(&self, params: ToolParams) -> ToolExecutionResult;

    /// Build the `ToolDefinition` sent to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters())
    }
}

// ─────────────────────────────────────────────
// Param helpers
// ─────────────────────────────────────────────

/// Extract a required `String` param.
pub fn require_string(params: &ToolParams, key: &str) -> Result<String, ToolError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| ToolError::invalid_argument(format!("Missing required parameter: {key}")))
}

/// Extract an optional `String` param. A present non-string value is rejected.
pub fn optional_string(params: &ToolParams, key: &str) -> Result<Option<String>, ToolError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ToolError::invalid_argument(format!("{key} must be a string"))),
    }
}

/// Extract an optional integer param. A present non-integer value is rejected.
pub fn optional_i64(params: &ToolParams, key: &str) -> Result<Option<i64>, ToolError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| ToolError::invalid_argument(format!("{key} must be an integer"))),
    }
}

/// Extract a required number param.
pub fn require_f64(params: &ToolParams, key: &str) -> Result<f64, ToolError> {
    params
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| ToolError::invalid_argument(format!("Missing required number parameter: {key}")))
}

/// Extract an optional list of strings. Non-string entries are rejected.
pub fn optional_string_list(params: &ToolParams, key: &str) -> Result<Vec<String>, ToolError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(|s| s.to_string())
                    .ok_or_else(|| ToolError::invalid_argument(format!("{key} must contain only strings")))
            })
            .collect(),
        Some(_) => Err(ToolError::invalid_argument(format!("{key} must be an array of strings"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_string_present() {
        let mut params = HashMap::new();
        params.insert("id".into(), json!("mem-1"));
        assert_eq!(require_string(&params, "id").unwrap(), "mem-1");
    }

    #[test]
    fn test_require_string_missing_is_invalid_argument() {
        let params = HashMap::new();
        let err = require_string(&params, "id").unwrap_err();
        assert_eq!(err.kind(), "InvalidArgument");
    }

    #[test]
    fn test_require_string_wrong_type() {
        let mut params = HashMap::new();
        params.insert("id".into(), json!(42));
        assert!(require_string(&params, "id").is_err());
    }

    #[test]
    fn test_optional_helpers() {
        let mut params = HashMap::new();
        params.insert("mode".into(), json!("fast"));
        params.insert("count".into(), json!(5));
        params.insert("nothing".into(), Value::Null);
        assert_eq!(optional_string(&params, "mode").unwrap(), Some("fast".into()));
        assert_eq!(optional_string(&params, "other").unwrap(), None);
        assert_eq!(optional_string(&params, "nothing").unwrap(), None);
        assert_eq!(optional_i64(&params, "count").unwrap(), Some(5));
        assert_eq!(optional_i64(&params, "missing").unwrap(), None);
    }

    #[test]
    fn test_optional_helpers_reject_wrong_type() {
        let mut params = HashMap::new();
        params.insert("mode".into(), json!(5));
        params.insert("count".into(), json!("3"));
        params.insert("ratio".into(), json!(2.5));
        assert_eq!(optional_string(&params, "mode").unwrap_err().kind(), "InvalidArgument");
        assert_eq!(optional_i64(&params, "count").unwrap_err().kind(), "InvalidArgument");
        assert!(optional_i64(&params, "ratio").is_err());
    }

    #[test]
    fn test_require_f64() {
        let mut params = HashMap::new();
        params.insert("importance".into(), json!(0.5));
        assert_eq!(require_f64(&params, "importance").unwrap(), 0.5);
        assert!(require_f64(&params, "missing").is_err());
    }

    #[test]
    fn test_optional_string_list() {
        let mut params = HashMap::new();
        params.insert("tags".into(), json!(["a", "b"]));
        assert_eq!(optional_string_list(&params, "tags").unwrap(), vec!["a", "b"]);
        assert!(optional_string_list(&params, "missing").unwrap().is_empty());

        params.insert("bad".into(), json!(["a", 1]));
        assert!(optional_string_list(&params, "bad").is_err());
        params.insert("scalar".into(), json!("a"));
        assert!(optional_string_list(&params, "scalar").is_err());
    }

    #[tokio::test]
    async fn test_to_definition_default() {
        struct DummyTool;

        #[async_trait]
        impl Tool for DummyTool {
            fn name(&self) -> &str { "dummy" }
            fn description(&self) -> &str { "A test tool" }
            fn parameters(&self) -> Value {
                json!({
                    "type": "object",
                    "properties": { "msg": { "type": "string" } },
                    "required": ["msg"]
                })
            }
            async fn execute(&self, _params: ToolParams) -> ToolExecutionResult {
                ToolExecutionResult::success(json!({"ok": true}))
            }
        }

        let def = DummyTool.to_definition();
        assert_eq!(def.function.name, "dummy");
        assert_eq!(def.function.description, "A test tool");
        assert_eq!(def.tool_type, "function");
        assert!(DummyTool.execute(HashMap::new()).await.is_success());
    }
}
