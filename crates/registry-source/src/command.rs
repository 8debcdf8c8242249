//! External command execution with captured output and a timeout.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::SourceError;

/// Default per-command timeout.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Runs external programs. A zero timeout disables the limit.
#[derive(Debug, Clone, Copy)]
pub struct CommandRunner {
    timeout: Duration,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TIMEOUT)
    }
}

impl CommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `program` with `args` and return its stdout.
    ///
    /// A non-zero exit becomes [`SourceError::CommandFailed`] carrying the
    /// trimmed stderr.
    pub async fn run(&self, program: &str, args: &[&str]) -> Result<String, SourceError> {
        let command_line = describe(program, args);
        tracing::debug!(command = %command_line, "running external command");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => SourceError::ToolNotFound {
                    tool: program.to_string(),
                },
                _ => SourceError::Io(e),
            })?;

        let output = if self.timeout.is_zero() {
            child.wait_with_output().await?
        } else {
            tokio::time::timeout(self.timeout, child.wait_with_output())
                .await
                .map_err(|_| SourceError::Timeout {
                    command: command_line.clone(),
                    secs: self.timeout.as_secs(),
                })??
        };

        if !output.status.success() {
            return Err(SourceError::CommandFailed {
                command: command_line,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn describe(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
