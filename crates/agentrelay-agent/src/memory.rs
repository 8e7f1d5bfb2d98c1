//! Memory collaborator — the boundary to the persistent memory store.
//!
//! Storage, indexing and search ranking belong to the store itself; this
//! crate only forwards requests from the `agentmemory_*` tools. A session
//! receives its own handle through the handler context.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One stored memory record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemoryRecord {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Relative importance in `0.0..=1.0`.
    pub importance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A new record to store.
#[derive(Clone, Debug, PartialEq)]
pub struct NewMemory {
    pub content: String,
    pub tags: Vec<String>,
    pub importance: f64,
}

/// Sort key for search results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemorySort {
    #[default]
    Created,
    Importance,
    Accessed,
}

impl MemorySort {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(MemorySort::Created),
            "importance" => Some(MemorySort::Importance),
            "accessed" => Some(MemorySort::Accessed),
            _ => None,
        }
    }
}

/// Search filter. Patterns are validated before they reach the store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryQuery {
    /// Plain substring match on content.
    pub content_contains: Option<String>,
    /// Regex match on content.
    pub content_regex: Option<String>,
    /// Records must carry all of these tags.
    pub tags: Vec<String>,
    /// Regex match on any tag.
    pub tag_regex: Option<String>,
    pub sort_by: MemorySort,
    pub limit: usize,
}

/// Operations the memory store offers to the memory tools.
///
/// Boolean results report whether the store applied the change.
#[async_trait]
pub trait MemoryBackend: Send + Sync {
    async fn store(&self, memory: NewMemory) -> anyhow::Result<MemoryRecord>;

    async fn recall(&self, id: &str) -> anyhow::Result<Option<MemoryRecord>>;

    async fn search(&self, query: &MemoryQuery) -> anyhow::Result<Vec<MemoryRecord>>;

    async fn forget(&self, id: &str) -> anyhow::Result<bool>;

    async fn add_tag(&self, id: &str, tag: &str) -> anyhow::Result<bool>;

    async fn remove_tag(&self, id: &str, tag: &str) -> anyhow::Result<bool>;

    async fn replace_tag(&self, id: &str, old_tag: &str, new_tag: &str) -> anyhow::Result<bool>;

    async fn edit_content(&self, id: &str, content: &str) -> anyhow::Result<bool>;

    async fn edit_importance(&self, id: &str, importance: f64) -> anyhow::Result<bool>;

    /// Append to the short-term (session scratch) memory.
    async fn add_short_term(&self, content: &str) -> anyhow::Result<bool>;
}
