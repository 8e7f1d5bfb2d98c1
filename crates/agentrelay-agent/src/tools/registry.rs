//! Tool Aggregator — the closed, name-keyed registry of internal tools.
//!
//! Built once at composition time and read-only afterwards, so one instance
//! can be shared by any number of concurrent sessions.

use std::collections::HashMap;
use std::sync::Arc;

use agentrelay_core::types::ToolDefinition;
use tracing::{debug, info, warn};

use super::base::{Tool, ToolParams};
use super::result::{ToolError, ToolExecutionResult};

/// Registration failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),
}

// ─────────────────────────────────────────────
// Aggregator
// ─────────────────────────────────────────────

/// Stores tools in registration order and dispatches calls by exact name.
///
/// Owns `Arc<dyn Tool>` so tools can be shared across threads and across
/// session-local aggregators derived with [`ToolAggregator::with_tools`].
#[derive(Clone, Default)]
pub struct ToolAggregator {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    ///
    /// A name that is already taken is rejected; the first registration stays.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            warn!(tool = %name, "duplicate tool registration rejected");
            return Err(RegistryError::DuplicateTool(name));
        }
        info!(tool = %name, "registered tool");
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// A session-local aggregator: these tools followed by `extra`.
    ///
    /// `self` is left untouched.
    pub fn with_tools(
        &self,
        extra: impl IntoIterator<Item = Arc<dyn Tool>>,
    ) -> Result<ToolAggregator, RegistryError> {
        let mut derived = self.clone();
        for tool in extra {
            derived.register(tool)?;
        }
        Ok(derived)
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Whether a tool with exactly this name is registered.
    pub fn can_handle(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Names of all registered tools, in registration order.
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// LLM-facing definitions for all registered tools, in registration order.
    pub fn list_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// Execute a tool by name.
    ///
    /// An unclaimed name yields a `NotFound` failure result; otherwise the
    /// tool's own result is passed through unchanged.
    pub async fn execute(&self, name: &str, params: ToolParams) -> ToolExecutionResult {
        let tool = match self.get(name) {
            Some(t) => t,
            None => {
                warn!(tool = name, "tool not found");
                return ToolExecutionResult::failure(ToolError::not_found(name));
            }
        };

        let result = tool.execute(params).await;
        match result.error() {
            Some(e) => warn!(tool = name, kind = e.kind(), error = %e, "tool execution failed"),
            None => debug!(tool = name, "tool execution succeeded"),
        }
        result
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the aggregator is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes its input and counts invocations.
    struct EchoTool {
        name: &'static str,
        calls: AtomicUsize,
    }

    impl EchoTool {
        fn named(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters(&self) -> Value {
            json!({
                "type": "object",
                "properties": { "text": { "type": "string", "description": "Text to echo" } },
                "required": ["text"]
            })
        }
        async fn execute(&self, params: ToolParams) -> ToolExecutionResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let text = params.get("text").and_then(|v| v.as_str()).unwrap_or("(empty)");
            ToolExecutionResult::success(json!({ "echo": text, "by": self.name }))
        }
    }

    /// Tool that always fails.
    struct FailTool;

    #[async_trait]
    impl Tool for FailTool {
        fn name(&self) -> &str {
            "fail"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}, "required": []})
        }
        async fn execute(&self, _params: ToolParams) -> ToolExecutionResult {
            ToolExecutionResult::failure(ToolError::execution_failed("intentional failure"))
        }
    }

    #[test]
    fn test_register_and_can_handle() {
        let mut agg = ToolAggregator::new();
        agg.register(EchoTool::named("echo")).unwrap();
        assert!(agg.can_handle("echo"));
        assert!(!agg.can_handle("nope"));
        assert_eq!(agg.len(), 1);
    }

    #[test]
    fn test_can_handle_is_case_sensitive_and_repeatable() {
        let mut agg = ToolAggregator::new();
        agg.register(EchoTool::named("echo")).unwrap();
        for _ in 0..3 {
            assert!(agg.can_handle("echo"));
            assert!(!agg.can_handle("Echo"));
        }
    }

    #[test]
    fn test_duplicate_rejected_first_wins() {
        let first = EchoTool::named("echo");
        let mut agg = ToolAggregator::new();
        agg.register(first.clone()).unwrap();

        let err = agg.register(EchoTool::named("echo")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateTool("echo".into()));
        assert_eq!(agg.len(), 1);
        assert!(Arc::ptr_eq(
            agg.get("echo").unwrap(),
            &(first as Arc<dyn Tool>)
        ));
    }

    #[test]
    fn test_definitions_in_registration_order() {
        let mut agg = ToolAggregator::new();
        agg.register(EchoTool::named("zeta")).unwrap();
        agg.register(Arc::new(FailTool)).unwrap();
        agg.register(EchoTool::named("alpha")).unwrap();

        let names: Vec<String> = agg
            .list_definitions()
            .iter()
            .map(|d| d.function.name.clone())
            .collect();
        assert_eq!(names, vec!["zeta", "fail", "alpha"]);
        assert_eq!(agg.tool_names(), names);
    }

    #[tokio::test]
    async fn test_execute_success() {
        let mut agg = ToolAggregator::new();
        agg.register(EchoTool::named("echo")).unwrap();
        let mut params = HashMap::new();
        params.insert("text".into(), json!("hello"));

        let result = agg.execute("echo", params).await;
        assert_eq!(result.to_value()["echo"], "hello");
    }

    #[tokio::test]
    async fn test_execute_not_found_is_data() {
        let agg = ToolAggregator::new();
        let result = agg.execute("missing", HashMap::new()).await;
        assert!(!result.is_success());
        assert_eq!(result.to_value()["error"], "NotFound");
    }

    #[tokio::test]
    async fn test_execute_failure_passed_through() {
        let mut agg = ToolAggregator::new();
        agg.register(Arc::new(FailTool)).unwrap();
        let result = agg.execute("fail", HashMap::new()).await;
        assert_eq!(result.to_value()["error"], "ToolExecutionFailed");
        assert_eq!(result.to_value()["message"], "intentional failure");
    }

    #[tokio::test]
    async fn test_execute_routes_only_to_named_tool() {
        let a = EchoTool::named("a");
        let b = EchoTool::named("b");
        let mut agg = ToolAggregator::new();
        agg.register(a.clone()).unwrap();
        agg.register(b.clone()).unwrap();

        let result = agg.execute("a", HashMap::new()).await;
        assert_eq!(result.to_value()["by"], "a");
        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_with_tools_leaves_shared_registry_untouched() {
        let mut shared = ToolAggregator::new();
        shared.register(EchoTool::named("echo")).unwrap();

        let session = shared
            .with_tools(vec![Arc::new(FailTool) as Arc<dyn Tool>])
            .unwrap();
        assert_eq!(session.tool_names(), vec!["echo", "fail"]);
        assert!(!shared.can_handle("fail"));

        let clash = shared.with_tools(vec![EchoTool::named("echo") as Arc<dyn Tool>]);
        assert!(clash.is_err());
    }

    #[test]
    fn test_default() {
        assert!(ToolAggregator::default().is_empty());
    }
}
