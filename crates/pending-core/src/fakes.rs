//! In-memory collaborators (testing only)
//!
//! Each fake satisfies one trait from [`crate::ports`] without touching the
//! network or the filesystem.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::{Entry, ListedChangeRequest, PendingError, Result};
use crate::ports::{
    BaselineFetcher, ChangeRequestLister, OutputSink, SnapshotFetch, SnapshotFetcher,
    WatermarkStore,
};
use crate::resolve::UnmatchedEntry;

// ---------------------------------------------------------------------------
// MemoryLister
// ---------------------------------------------------------------------------

/// Returns a fixed listing, or a fixed error.
#[derive(Debug, Default)]
pub struct MemoryLister {
    listing: Vec<ListedChangeRequest>,
    failure: Option<String>,
}

impl MemoryLister {
    pub fn new(listing: Vec<ListedChangeRequest>) -> Self {
        Self {
            listing,
            failure: None,
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            listing: Vec::new(),
            failure: Some(message.into()),
        }
    }
}

#[async_trait]
impl ChangeRequestLister for MemoryLister {
    async fn list_change_requests(&self) -> Result<Vec<ListedChangeRequest>> {
        match &self.failure {
            Some(message) => Err(PendingError::Source(message.clone())),
            None => Ok(self.listing.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// MemorySnapshots
// ---------------------------------------------------------------------------

/// Snapshot contents keyed by change-request number. Unknown numbers are
/// unavailable. Every requested number is recorded.
#[derive(Debug, Default)]
pub struct MemorySnapshots {
    snapshots: HashMap<u64, String>,
    errors: HashMap<u64, String>,
    requested: Mutex<Vec<u64>>,
}

impl MemorySnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, number: u64, content: impl Into<String>) -> Self {
        self.snapshots.insert(number, content.into());
        self
    }

    /// Make fetching `number` fail with a source error.
    pub fn with_error(mut self, number: u64, message: impl Into<String>) -> Self {
        self.errors.insert(number, message.into());
        self
    }

    pub fn requested(&self) -> Vec<u64> {
        self.requested.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl SnapshotFetcher for MemorySnapshots {
    async fn fetch_snapshot(&self, number: u64) -> Result<SnapshotFetch> {
        self.requested.lock().unwrap_or_else(PoisonError::into_inner).push(number);
        if let Some(message) = self.errors.get(&number) {
            return Err(PendingError::Source(message.clone()));
        }
        Ok(match self.snapshots.get(&number) {
            Some(content) => SnapshotFetch::Content(content.clone()),
            None => SnapshotFetch::Unavailable(format!("no snapshot for #{number}")),
        })
    }
}

// ---------------------------------------------------------------------------
// MemoryBaseline
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct MemoryBaseline {
    content: std::result::Result<String, String>,
}

impl MemoryBaseline {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Ok(content.into()),
        }
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self {
            content: Err(message.into()),
        }
    }
}

#[async_trait]
impl BaselineFetcher for MemoryBaseline {
    async fn fetch_baseline(&self) -> Result<String> {
        self.content.clone().map_err(PendingError::Source)
    }
}

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

/// Keeps the last written documents; `load_previous` returns whatever was
/// seeded or last written.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Entry>>,
    unmatched: Mutex<Vec<UnmatchedEntry>>,
    writes: Mutex<usize>,
    fail_writes: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(previous: Vec<Entry>) -> Self {
        Self {
            entries: Mutex::new(previous),
            ..Self::default()
        }
    }

    /// Sink whose writes always fail.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn unmatched(&self) -> Vec<UnmatchedEntry> {
        self.unmatched.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl OutputSink for MemorySink {
    async fn load_previous(&self) -> Result<Vec<Entry>> {
        Ok(self.entries())
    }

    async fn write(&self, entries: &[Entry], unmatched: &[UnmatchedEntry]) -> Result<()> {
        if self.fail_writes {
            return Err(PendingError::Output("sink refused write".to_string()));
        }
        *self.entries.lock().unwrap_or_else(PoisonError::into_inner) = entries.to_vec();
        *self.unmatched.lock().unwrap_or_else(PoisonError::into_inner) = unmatched.to_vec();
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryWatermark
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryWatermark {
    value: Mutex<Option<u64>>,
}

impl MemoryWatermark {
    pub fn new(initial: Option<u64>) -> Self {
        Self {
            value: Mutex::new(initial),
        }
    }

    pub fn current(&self) -> Option<u64> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl WatermarkStore for MemoryWatermark {
    async fn load(&self) -> Result<Option<u64>> {
        Ok(self.current())
    }

    async fn store(&self, watermark: u64) -> Result<()> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(watermark);
        Ok(())
    }
}
