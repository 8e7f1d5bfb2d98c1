//! Agentrelay Core — shared types, errors, configuration, and utilities.
//!
//! - **types**: conversation messages, tool calls, tool definitions, LLM responses
//! - **error**: session-level error taxonomy
//! - **config**: JSON config schema, loader, and env overrides
//! - **utils**: path and string helpers

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use error::AgentError;
