//! Error taxonomy for the reconciliation pipeline.
//!
//! Only setup failures surface as [`PendingError`]. Per-change-request
//! problems become skip counters and attribution misses become unmatched
//! report rows; neither is an error.

/// Reconciliation errors.
#[derive(Debug, thiserror::Error)]
pub enum PendingError {
    #[error("setup failed: {0}")]
    Setup(String),

    #[error("required tool not available: {tool}")]
    ToolUnavailable { tool: String },

    #[error("source error: {0}")]
    Source(String),

    #[error("malformed baseline document: {0}")]
    MalformedBaseline(String),

    #[error("state file error at {path}: {detail}")]
    State { path: String, detail: String },

    #[error("output error: {0}")]
    Output(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, PendingError>;
