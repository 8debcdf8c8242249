//! Presence checks for the external tools the adapters shell out to.

use std::process::Stdio;

use tokio::process::Command;

use crate::error::SourceError;

/// Tools a live run needs.
pub const REQUIRED_TOOLS: &[&str] = &["gh", "git"];

/// Check whether `tool --version` runs successfully.
pub async fn is_tool_available(tool: &str) -> bool {
    Command::new(tool)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Fail with the first missing tool.
pub async fn require_tools(tools: &[&str]) -> Result<(), SourceError> {
    for tool in tools {
        if !is_tool_available(tool).await {
            return Err(SourceError::ToolNotFound {
                tool: (*tool).to_string(),
            });
        }
        tracing::debug!(tool = %tool, "tool available");
    }
    Ok(())
}
