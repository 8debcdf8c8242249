//! Filesystem-backed output sink and watermark store.

pub mod output;
pub mod watermark;

pub use output::{FsOutputSink, ENTRIES_FILE, UNMATCHED_FILE};
pub use watermark::{FsWatermarkStore, WatermarkState};

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::domain::Result;

/// Replace `path` with `data` atomically: write a temp file in the same
/// directory, then rename it over the target.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
