//! Backend call failures.
//!
//! A `ProviderError` means the backend produced no usable response at all.
//! An empty answer is a successful `LlmResponse` with no content.

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("client configuration error: {0}")]
    Client(String),
}
