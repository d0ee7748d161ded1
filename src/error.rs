//! Error types for OmniSuggest
//!
//! Errors only travel across collaborator seams (history lookups, the suggest
//! transport, config loading). The engine itself absorbs them: a failed source
//! contributes nothing to an aggregation pass and is logged via `tracing`.

use thiserror::Error;

/// The primary error type for OmniSuggest operations.
#[derive(Error, Debug)]
pub enum SuggestError {
    /// Configuration-related errors (invalid config, unknown default provider, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Search provider errors (missing template, unsupported replacement, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Suggest transport failures (connection errors, timeouts, bad status)
    #[error("Transport error: {0}")]
    Transport(String),

    /// History lookup failures
    #[error("History error: {0}")]
    History(String),

    /// Suggest response did not match the expected wire shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A specialized `Result` type for OmniSuggest operations.
pub type Result<T> = std::result::Result<T, SuggestError>;
