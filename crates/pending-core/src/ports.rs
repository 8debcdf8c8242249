//! Collaborator seams of the pipeline.
//!
//! Implement these traits to plug in the real registry (see the
//! `registry-source` crate), the filesystem stores in [`crate::store`], or
//! the in-memory fakes in [`crate::fakes`].

use async_trait::async_trait;

use crate::domain::{Entry, ListedChangeRequest, Result};
use crate::resolve::UnmatchedEntry;

/// Lists open change-requests touching the tracked document.
#[async_trait]
pub trait ChangeRequestLister: Send + Sync {
    /// Open change-requests in listing order.
    async fn list_change_requests(&self) -> Result<Vec<ListedChangeRequest>>;
}

/// Content of the tracked document at a change-request's merge state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotFetch {
    Content(String),
    /// Expected and recoverable: no merge ref, file absent, fetch refused.
    Unavailable(String),
}

#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    async fn fetch_snapshot(&self, number: u64) -> Result<SnapshotFetch>;
}

/// Content of the tracked document at the reference branch head.
#[async_trait]
pub trait BaselineFetcher: Send + Sync {
    async fn fetch_baseline(&self) -> Result<String>;
}

/// Destination of the reconciled documents.
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Entries emitted by a previous run, empty if there are none.
    async fn load_previous(&self) -> Result<Vec<Entry>>;

    /// Replace both documents.
    async fn write(&self, entries: &[Entry], unmatched: &[UnmatchedEntry]) -> Result<()>;
}

/// Single integer cell holding the highest processed change-request number.
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    async fn load(&self) -> Result<Option<u64>>;

    async fn store(&self, watermark: u64) -> Result<()>;
}
