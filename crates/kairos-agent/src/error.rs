//! Error types for kairos-agent

use thiserror::Error;

/// Result type alias using kairos-agent Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving an agent session
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Terminal or other I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Server-sent events error
    #[error("SSE error: {0}")]
    Sse(String),

    /// The agent server reported a failed run
    #[error("Agent error: {message} (type: {error_type})")]
    Agent { error_type: String, message: String },

    /// An out-of-band authorization did not complete
    #[error("Authorization failed: {0}")]
    Authorization(String),

    /// The in-flight turn was cancelled by the user
    #[error("Turn cancelled")]
    Cancelled,

    /// The run kept interrupting past the configured bound
    #[error("Run still interrupting after {0} resumes")]
    ResumeLimit(usize),

    /// A generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an agent error from the server's error type and message
    pub fn agent(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Agent {
            error_type: error_type.into(),
            message: message.into(),
        }
    }

    /// Whether this error was caused by user cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
