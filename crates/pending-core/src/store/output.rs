use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::{Entry, PendingError, Result};
use crate::ports::OutputSink;
use crate::resolve::UnmatchedEntry;
use crate::store::write_atomic;

/// Reconciled entries, one record per pending plugin.
pub const ENTRIES_FILE: &str = "plugins.json";
/// Entries that need manual attribution.
pub const UNMATCHED_FILE: &str = "unmatched.json";

/// Writes `plugins.json` and `unmatched.json` into an output directory.
#[derive(Debug, Clone)]
pub struct FsOutputSink {
    dir: PathBuf,
}

impl FsOutputSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn entries_path(&self) -> PathBuf {
        self.dir.join(ENTRIES_FILE)
    }

    pub fn unmatched_path(&self) -> PathBuf {
        self.dir.join(UNMATCHED_FILE)
    }

    fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
        let mut content = serde_json::to_string_pretty(value)?;
        content.push('\n');
        write_atomic(path, content.as_bytes())
            .map_err(|e| PendingError::Output(format!("write {}: {e}", path.display())))
    }
}

#[async_trait]
impl OutputSink for FsOutputSink {
    async fn load_previous(&self) -> Result<Vec<Entry>> {
        let path = self.entries_path();
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<Vec<serde_json::Value>>(&content) {
            Ok(records) => Ok(records.iter().filter_map(Entry::from_record).collect()),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "previous output unreadable, starting empty"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn write(&self, entries: &[Entry], unmatched: &[UnmatchedEntry]) -> Result<()> {
        Self::write_json(&self.entries_path(), &entries)?;
        Self::write_json(&self.unmatched_path(), &unmatched)?;
        Ok(())
    }
}
