//! LLM provider layer for Agentrelay.
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`] — the model backend boundary the orchestrator talks to
//! - [`http_provider::HttpProvider`] — OpenAI-compatible HTTP client
//! - [`error::ProviderError`] — why a backend call produced no response

pub mod error;
pub mod http_provider;
pub mod traits;

pub use error::ProviderError;
pub use http_provider::HttpProvider;
pub use traits::{LlmProvider, LlmRequestConfig};
