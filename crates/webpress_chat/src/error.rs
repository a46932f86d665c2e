//! Error types for the chat core.

use thiserror::Error;

/// Result type alias for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;

/// Errors that can occur in the chat pipeline.
#[derive(Error, Debug)]
pub enum ChatError {
    /// No provider credential configured; the pipeline short-circuits
    /// before this ever becomes an error return, but backends still
    /// refuse to be constructed without a key.
    #[error("Provider credential not configured. Add your OpenRouter key in Settings")]
    NotConfigured,

    /// Non-2xx response from the chat-completion provider
    #[error("Provider error {status}: {message}")]
    Provider { status: u16, message: String },

    /// Generative backend call failed
    #[error("Generative backend error: {0}")]
    Generative(String),

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// Interactive key selection was required and failed
    #[error("Key selection failed: {0}")]
    KeySelection(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File system error (settings blob)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
