//! Error types for Gemini client.

use thiserror::Error;

/// Result type for Gemini client operations.
pub type Result<T> = std::result::Result<T, GeminiError>;

/// Gemini client errors.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Missing API key or an HTTP client that could not be built
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection failure or timeout before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; `status` is Google's canonical code name when the
    /// body carries one (e.g. `INVALID_ARGUMENT`, `RESOURCE_EXHAUSTED`)
    #[error("Gemini API error ({code} {status}): {message}")]
    Api {
        code: u16,
        status: String,
        message: String,
    },

    /// A 2xx response with no text: the prompt or the candidate was blocked
    #[error("Gemini returned no text (reason: {reason})")]
    Blocked { reason: String },

    /// Body did not match the `generateContent` response shape
    #[error("Parse error: {0}")]
    Parse(String),
}

impl GeminiError {
    /// The request ran past the client's timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}
