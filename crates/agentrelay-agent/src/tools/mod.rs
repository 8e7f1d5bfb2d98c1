//! Internal tools: the trait, structured results, the aggregator, the
//! summarizing decorator and the memory-backed tools.

pub mod base;
pub mod memory;
pub mod registry;
pub mod result;
pub mod summarize;

pub use base::{optional_i64, optional_string, optional_string_list, require_f64, require_string, Tool, ToolParams};
pub use memory::{memory_tools, MemoryOp, MemoryTool};
pub use registry::{RegistryError, ToolAggregator};
pub use result::{ToolError, ToolExecutionResult};
pub use summarize::{summarized_variants, SummarizingTool, INSTRUCTIONS_PARAM};
