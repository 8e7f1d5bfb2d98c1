//! Memory tools — `agentmemory_*` capabilities backed by a [`MemoryBackend`].
//!
//! One `MemoryTool` per operation. Arguments are validated here; the store
//! itself is never called with malformed input.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};
use tracing::debug;

use crate::memory::{MemoryBackend, MemoryQuery, MemorySort, NewMemory};

use super::base::{
    optional_i64, optional_string, optional_string_list, require_f64, require_string, Tool,
    ToolParams,
};
use super::result::{ToolError, ToolExecutionResult};

const DEFAULT_SEARCH_LIMIT: i64 = 10;
const MAX_SEARCH_LIMIT: i64 = 100;
const DEFAULT_IMPORTANCE: f64 = 0.5;

/// The operation a [`MemoryTool`] performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryOp {
    Store,
    Recall,
    Search,
    Forget,
    AddTag,
    RemoveTag,
    ReplaceTag,
    EditContent,
    EditImportance,
    AddShortTerm,
}

impl MemoryOp {
    pub const ALL: [MemoryOp; 10] = [
        MemoryOp::Store,
        MemoryOp::Recall,
        MemoryOp::Search,
        MemoryOp::Forget,
        MemoryOp::AddTag,
        MemoryOp::RemoveTag,
        MemoryOp::ReplaceTag,
        MemoryOp::EditContent,
        MemoryOp::EditImportance,
        MemoryOp::AddShortTerm,
    ];

    pub fn tool_name(self) -> &'static str {
        match self {
            MemoryOp::Store => "agentmemory_store",
            MemoryOp::Recall => "agentmemory_recall",
            MemoryOp::Search => "agentmemory_search",
            MemoryOp::Forget => "agentmemory_forget",
            MemoryOp::AddTag => "agentmemory_add_tag",
            MemoryOp::RemoveTag => "agentmemory_remove_tag",
            MemoryOp::ReplaceTag => "agentmemory_replace_tag",
            MemoryOp::EditContent => "agentmemory_edit_content",
            MemoryOp::EditImportance => "agentmemory_edit_importance",
            MemoryOp::AddShortTerm => "agentmemory_add_short_term",
        }
    }

    fn description(self) -> &'static str {
        match self {
            MemoryOp::Store => "Store a new long-term memory with optional tags and importance.",
            MemoryOp::Recall => "Recall a single memory by its id.",
            MemoryOp::Search => {
                "Search memories by content substring or regex, tags or tag regex. \
                 Results are sorted by `sort_by` and capped at `limit`."
            }
            MemoryOp::Forget => "Permanently delete a memory by its id.",
            MemoryOp::AddTag => "Add a tag to a memory.",
            MemoryOp::RemoveTag => "Remove a tag from a memory.",
            MemoryOp::ReplaceTag => "Replace one tag of a memory with another.",
            MemoryOp::EditContent => "Replace the content of a memory.",
            MemoryOp::EditImportance => "Change the importance (0.0 to 1.0) of a memory.",
            MemoryOp::AddShortTerm => "Note something in short-term memory for the current session.",
        }
    }

    fn parameters(self) -> Value {
        let id = json!({ "type": "string", "description": "Memory id" });
        let tag = json!({ "type": "string", "description": "Tag name" });
        let importance = json!({
            "type": "number", "minimum": 0.0, "maximum": 1.0,
            "description": "Importance from 0.0 to 1.0"
        });
        match self {
            MemoryOp::Store => json!({
                "type": "object",
                "properties": {
                    "content": { "type": "string", "description": "What to remember" },
                    "tags": { "type": "array", "items": { "type": "string" } },
                    "importance": importance
                },
                "required": ["content"]
            }),
            MemoryOp::Recall | MemoryOp::Forget => json!({
                "type": "object",
                "properties": { "id": id },
                "required": ["id"]
            }),
            MemoryOp::Search => json!({
                "type": "object",
                "properties": {
                    "content": { "type": "string", "description": "Substring the content must contain" },
                    "content_regex": { "type": "string", "description": "Regex the content must match" },
                    "tags": { "type": "array", "items": { "type": "string" }, "description": "Tags every result must carry" },
                    "tag_regex": { "type": "string", "description": "Regex at least one tag must match" },
                    "sort_by": { "type": "string", "enum": ["created", "importance", "accessed"] },
                    "limit": { "type": "integer", "minimum": 1, "maximum": MAX_SEARCH_LIMIT }
                },
                "required": []
            }),
            MemoryOp::AddTag | MemoryOp::RemoveTag => json!({
                "type": "object",
                "properties": { "id": id, "tag": tag },
                "required": ["id", "tag"]
            }),
            MemoryOp::ReplaceTag => json!({
                "type": "object",
                "properties": { "id": id, "old_tag": tag, "new_tag": tag },
                "required": ["id", "old_tag", "new_tag"]
            }),
            MemoryOp::EditContent => json!({
                "type": "object",
                "properties": { "id": id, "content": { "type": "string" } },
                "required": ["id", "content"]
            }),
            MemoryOp::EditImportance => json!({
                "type": "object",
                "properties": { "id": id, "importance": importance },
                "required": ["id", "importance"]
            }),
            MemoryOp::AddShortTerm => json!({
                "type": "object",
                "properties": { "content": { "type": "string" } },
                "required": ["content"]
            }),
        }
    }
}

// ─────────────────────────────────────────────
// MemoryTool
// ─────────────────────────────────────────────

/// An internal tool forwarding one memory operation to the store.
pub struct MemoryTool {
    op: MemoryOp,
    backend: Arc<dyn MemoryBackend>,
}

impl MemoryTool {
    pub fn new(op: MemoryOp, backend: Arc<dyn MemoryBackend>) -> Self {
        Self { op, backend }
    }

    async fn run(&self, params: &ToolParams) -> Result<Value, ToolError> {
        match self.op {
            MemoryOp::Store => {
                let content = require_non_empty(params, "content")?;
                let tags = optional_string_list(params, "tags")?;
                let importance = match params.get("importance") {
                    None | Some(Value::Null) => DEFAULT_IMPORTANCE,
                    Some(_) => checked_importance(params)?,
                };
                let record = self
                    .backend
                    .store(NewMemory {
                        content,
                        tags,
                        importance,
                    })
                    .await
                    .map_err(store_error)?;
                Ok(json!({ "id": record.id, "memory": record }))
            }
            MemoryOp::Recall => {
                let id = require_non_empty(params, "id")?;
                match self.backend.recall(&id).await.map_err(store_error)? {
                    Some(record) => Ok(json!({ "memory": record })),
                    None => Err(ToolError::execution_failed(format!("memory {id} not found"))),
                }
            }
            MemoryOp::Search => {
                let query = build_query(params)?;
                let records = self.backend.search(&query).await.map_err(store_error)?;
                Ok(json!({ "count": records.len(), "memories": records }))
            }
            MemoryOp::Forget => {
                let id = require_non_empty(params, "id")?;
                applied(self.backend.forget(&id).await, &id)?;
                Ok(json!({ "deletedId": id }))
            }
            MemoryOp::AddTag => {
                let id = require_non_empty(params, "id")?;
                let tag = require_non_empty(params, "tag")?;
                applied(self.backend.add_tag(&id, &tag).await, &id)?;
                Ok(json!({ "id": id, "addedTag": tag }))
            }
            MemoryOp::RemoveTag => {
                let id = require_non_empty(params, "id")?;
                let tag = require_non_empty(params, "tag")?;
                applied(self.backend.remove_tag(&id, &tag).await, &id)?;
                Ok(json!({ "id": id, "removedTag": tag }))
            }
            MemoryOp::ReplaceTag => {
                let id = require_non_empty(params, "id")?;
                let old_tag = require_non_empty(params, "old_tag")?;
                let new_tag = require_non_empty(params, "new_tag")?;
                applied(self.backend.replace_tag(&id, &old_tag, &new_tag).await, &id)?;
                Ok(json!({ "id": id, "oldTag": old_tag, "newTag": new_tag }))
            }
            MemoryOp::EditContent => {
                let id = require_non_empty(params, "id")?;
                let content = require_non_empty(params, "content")?;
                applied(self.backend.edit_content(&id, &content).await, &id)?;
                Ok(json!({ "id": id, "content": content }))
            }
            MemoryOp::EditImportance => {
                let id = require_non_empty(params, "id")?;
                let importance = checked_importance(params)?;
                applied(self.backend.edit_importance(&id, importance).await, &id)?;
                Ok(json!({ "id": id, "importance": importance }))
            }
            MemoryOp::AddShortTerm => {
                let content = require_non_empty(params, "content")?;
                match self.backend.add_short_term(&content).await.map_err(store_error)? {
                    true => Ok(json!({ "stored": true })),
                    false => Err(ToolError::execution_failed("short-term memory rejected the entry")),
                }
            }
        }
    }
}

#[async_trait]
impl Tool for MemoryTool {
    fn name(&self) -> &str {
        self.op.tool_name()
    }

    fn description(&self) -> &str {
        self.op.description()
    }

    fn parameters(&self) -> Value {
        self.op.parameters()
    }

    async fn execute(&self, params: ToolParams) -> ToolExecutionResult {
        debug!(tool = self.op.tool_name(), "memory operation");
        self.run(&params).await.into()
    }
}

/// All memory tools bound to one store handle, in a fixed order.
pub fn memory_tools(backend: Arc<dyn MemoryBackend>) -> Vec<Arc<dyn Tool>> {
    MemoryOp::ALL
        .iter()
        .map(|&op| Arc::new(MemoryTool::new(op, backend.clone())) as Arc<dyn Tool>)
        .collect()
}

// ─────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────

fn require_non_empty(params: &ToolParams, key: &str) -> Result<String, ToolError> {
    let value = require_string(params, key)?;
    if value.trim().is_empty() {
        return Err(ToolError::invalid_argument(format!("{key} must not be empty")));
    }
    Ok(value)
}

fn checked_importance(params: &ToolParams) -> Result<f64, ToolError> {
    let importance = require_f64(params, "importance")?;
    if !(0.0..=1.0).contains(&importance) {
        return Err(ToolError::invalid_argument(format!(
            "importance must be between 0.0 and 1.0, got {importance}"
        )));
    }
    Ok(importance)
}

fn checked_regex(params: &ToolParams, key: &str) -> Result<Option<String>, ToolError> {
    match optional_string(params, key)? {
        Some(pattern) => {
            Regex::new(&pattern)
                .map_err(|e| ToolError::invalid_argument(format!("invalid {key}: {e}")))?;
            Ok(Some(pattern))
        }
        None => Ok(None),
    }
}

fn build_query(params: &ToolParams) -> Result<MemoryQuery, ToolError> {
    let sort_by = match optional_string(params, "sort_by")? {
        Some(s) => MemorySort::parse(&s).ok_or_else(|| {
            ToolError::invalid_argument(format!(
                "sort_by must be one of created, importance, accessed (got {s})"
            ))
        })?,
        None => MemorySort::default(),
    };
    let limit = optional_i64(params, "limit")?
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT) as usize;

    Ok(MemoryQuery {
        content_contains: optional_string(params, "content")?,
        content_regex: checked_regex(params, "content_regex")?,
        tags: optional_string_list(params, "tags")?,
        tag_regex: checked_regex(params, "tag_regex")?,
        sort_by,
        limit,
    })
}

fn store_error(e: anyhow::Error) -> ToolError {
    ToolError::execution_failed(format!("memory store error: {e}"))
}

fn applied(outcome: anyhow::Result<bool>, id: &str) -> Result<(), ToolError> {
    match outcome.map_err(store_error)? {
        true => Ok(()),
        false => Err(ToolError::execution_failed(format!(
            "memory {id} not found or unchanged"
        ))),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
