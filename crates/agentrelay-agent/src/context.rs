//! Session context — the conversation and accounting owned by one session.
//!
//! Builds the opening message list and the tool catalog, then only ever
//! appends. Nothing is removed or rewritten once pushed.

use agentrelay_core::types::{Message, ToolCall, ToolDefinition};

use crate::tools::result::ToolExecutionResult;

// ─────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────

/// Merge internal and external definitions into one catalog.
///
/// Internal definitions come first, in registration order. An external
/// definition whose name is already taken is returned in the second list
/// instead of the catalog.
pub fn merge_catalog(
    internal: Vec<ToolDefinition>,
    external: Vec<ToolDefinition>,
) -> (Vec<ToolDefinition>, Vec<ToolDefinition>) {
    let mut catalog = internal;
    let mut shadowed = Vec::new();
    for def in external {
        if catalog.iter().any(|d| d.name() == def.name()) {
            shadowed.push(def);
        } else {
            catalog.push(def);
        }
    }
    (catalog, shadowed)
}

// ─────────────────────────────────────────────
// SessionState
// ─────────────────────────────────────────────

/// Accumulating state of one session.
#[derive(Debug)]
pub struct SessionState {
    iteration: u32,
    messages: Vec<Message>,
    tools: Vec<ToolDefinition>,
    total_used_tokens: u64,
    last_assistant_text: Option<String>,
}

impl SessionState {
    /// Opening state: optional system prompt, then the inbound history.
    pub fn new(system_prompt: Option<&str>, history: Vec<Message>, tools: Vec<ToolDefinition>) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 1);
        if let Some(prompt) = system_prompt.filter(|p| !p.trim().is_empty()) {
            messages.push(Message::system(prompt));
        }
        messages.extend(history);

        Self {
            iteration: 0,
            messages,
            tools,
            total_used_tokens: 0,
            last_assistant_text: None,
        }
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn total_used_tokens(&self) -> u64 {
        self.total_used_tokens
    }

    /// Most recent non-empty assistant text seen in this session.
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.last_assistant_text.as_deref()
    }

    /// Record backend or tool spend.
    pub fn add_tokens(&mut self, tokens: u64) {
        self.total_used_tokens = self.total_used_tokens.saturating_add(tokens);
    }

    /// Append the assistant turn that requested `tool_calls`.
    pub fn push_tool_calls(&mut self, content: Option<String>, tool_calls: Vec<ToolCall>) {
        self.remember_text(content.as_deref());
        self.messages.push(Message::assistant_tool_calls(content, tool_calls));
    }

    /// Append the final assistant answer.
    pub fn push_answer(&mut self, content: &str) {
        self.remember_text(Some(content));
        self.messages.push(Message::assistant(content));
    }

    /// Fold one tool outcome back into the conversation.
    pub fn push_tool_result(&mut self, tool_call_id: &str, result: &ToolExecutionResult) {
        self.messages
            .push(Message::tool_result(tool_call_id, result.to_content()));
    }

    /// Mark one tool round-trip complete.
    pub fn complete_iteration(&mut self) {
        self.iteration += 1;
    }

    /// Consume the state, yielding the transcript.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    fn remember_text(&mut self, content: Option<&str>) {
        if let Some(text) = content.filter(|t| !t.trim().is_empty()) {
            self.last_assistant_text = Some(text.to_string());
        }
    }
}
