use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{PendingError, Result};
use crate::ports::WatermarkStore;
use crate::store::write_atomic;

/// On-disk shape of the state file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatermarkState {
    pub last_pr_number: u64,
    pub updated_at: DateTime<Utc>,
}

/// JSON state file holding the watermark.
///
/// A file containing only an integer is accepted as well.
#[derive(Debug, Clone)]
pub struct FsWatermarkStore {
    path: PathBuf,
}

impl FsWatermarkStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn state_error(&self, detail: impl Into<String>) -> PendingError {
        PendingError::State {
            path: self.path.display().to_string(),
            detail: detail.into(),
        }
    }
}

#[async_trait]
impl WatermarkStore for FsWatermarkStore {
    async fn load(&self) -> Result<Option<u64>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.state_error(e.to_string())),
        };
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if let Ok(bare) = trimmed.parse::<u64>() {
            return Ok(Some(bare));
        }
        let state: WatermarkState =
            serde_json::from_str(trimmed).map_err(|e| self.state_error(e.to_string()))?;
        Ok(Some(state.last_pr_number))
    }

    async fn store(&self, watermark: u64) -> Result<()> {
        let state = WatermarkState {
            last_pr_number: watermark,
            updated_at: Utc::now(),
        };
        let mut content = serde_json::to_string_pretty(&state)?;
        content.push('\n');
        write_atomic(&self.path, content.as_bytes()).map_err(|e| self.state_error(e.to_string()))
    }
}
