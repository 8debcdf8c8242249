//! Structured observability hooks for the reconciliation run.
//!
//! This module provides:
//! - A run-scoped tracing span via `run_span`
//! - Emission functions for the notable points of a run
//!
//! Unmatched entries are emitted at `warn!` so operators see every entry
//! that needs manual attribution.

use tracing::{info, warn};

use crate::config::RunMode;
use crate::extract::SkipReason;
use crate::resolve::UnmatchedReason;

/// Span covering one run. Attach it with `tracing::Instrument` so every
/// event of the run carries the run id, across await points.
///
/// # Example
///
/// ```ignore
/// reconciler.execute(&mut summary).instrument(run_span("3f1c...")).await
/// ```
pub fn run_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("pending.run", run_id = %run_id)
}

pub fn emit_run_started(run_id: &str, repo: &str, mode: RunMode) {
    info!(event = "run.started", run_id = %run_id, repo = %repo, mode = %mode);
}

pub fn emit_change_requests_listed(listed: usize, selected: usize, watermark: Option<u64>) {
    info!(
        event = "change_requests.listed",
        listed = listed,
        selected = selected,
        watermark = ?watermark,
    );
}

pub fn emit_change_request_skipped(number: u64, reason: SkipReason, detail: &str) {
    info!(
        event = "change_request.skipped",
        number = number,
        reason = %reason,
        detail = %detail,
    );
}

/// Warning for an entry that could not be attributed.
pub fn emit_entry_unmatched(id: &str, repo: &str, reason: UnmatchedReason) {
    warn!(
        event = "entry.unmatched",
        id = %id,
        repo = %repo,
        reason = %reason,
        "entry needs manual attribution"
    );
}

pub fn emit_output_written(entries: usize, unmatched: usize) {
    info!(event = "output.written", entries = entries, unmatched = unmatched);
}

pub fn emit_watermark_advanced(previous: Option<u64>, current: u64) {
    info!(event = "watermark.advanced", previous = ?previous, current = current);
}

pub fn emit_run_finished(run_id: &str, duration_ms: u64, success: bool) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        success = success,
    );
}
