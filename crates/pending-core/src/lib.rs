//! Pending Plugin Catalog Core
//!
//! Reconciles open change-requests against the registry document into a
//! catalog of plugin submissions awaiting review, plus a report of the
//! entries that could not be attributed.

pub mod baseline;
pub mod config;
pub mod dedupe;
pub mod domain;
pub mod extract;
pub mod fakes;
pub mod incremental;
pub mod obs;
pub mod pipeline;
pub mod ports;
pub mod resolve;
pub mod store;
pub mod summary;
pub mod telemetry;

pub use baseline::BaselineSet;
pub use config::{
    OutputOrder, ReconcileConfig, RunMode, DEFAULT_BASE_BRANCH, DEFAULT_LIST_LIMIT,
    DEFAULT_REPO, DEFAULT_TRACKED_FILE,
};
pub use dedupe::{dedupe, Deduplicated};
pub use domain::{ChangeRequest, Entry, ListedChangeRequest, PendingError, Result};
pub use extract::{extract_candidates, Candidate, Extraction, SkipReason};
pub use incremental::{above_watermark, highest_number, merge_entries, sort_entries, MergeOutcome};
pub use pipeline::Reconciler;
pub use ports::{
    BaselineFetcher, ChangeRequestLister, OutputSink, SnapshotFetch, SnapshotFetcher,
    WatermarkStore,
};
pub use resolve::{
    AttributionResolver, AttributionVerdict, Resolution, ResolutionIndex, UnmatchedEntry,
    UnmatchedReason, VerdictTally,
};
pub use store::{FsOutputSink, FsWatermarkStore, ENTRIES_FILE, UNMATCHED_FILE};
pub use summary::RunSummary;
pub use telemetry::{init_tracing, LogFormat};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
