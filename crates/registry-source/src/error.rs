//! Error types for registry-source

use pending_core::PendingError;
use thiserror::Error;

/// Errors raised while talking to `gh` and `git`.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Executable missing from PATH
    #[error("{tool} is not installed or not in PATH")]
    ToolNotFound { tool: String },

    /// Non-zero exit status
    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("`{command}` timed out after {secs} seconds")]
    Timeout { command: String, secs: u64 },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<SourceError> for PendingError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::ToolNotFound { tool } => PendingError::ToolUnavailable { tool },
            other => PendingError::Source(other.to_string()),
        }
    }
}
