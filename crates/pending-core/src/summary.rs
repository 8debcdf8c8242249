//! Run summary printed at the end of every run, successful or not.

use serde::{Deserialize, Serialize};

use crate::config::RunMode;
use crate::extract::SkipReason;
use crate::resolve::VerdictTally;

/// Counters collected while a run progresses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: String,
    pub mode: RunMode,
    /// Change-requests returned by the lister.
    pub listed: usize,
    /// Change-requests at or below the watermark, not processed.
    pub already_processed: usize,
    /// Change-requests whose snapshot produced candidates (possibly zero).
    pub processed: usize,
    pub skipped_unavailable: usize,
    pub skipped_malformed: usize,
    pub candidates: usize,
    pub duplicates_collapsed: usize,
    pub verdicts: VerdictTally,
    /// Previous entries dropped during an incremental merge.
    pub pruned: usize,
    /// Previous entries overwritten during an incremental merge.
    pub replaced: usize,
    /// Entries in the written output document.
    pub emitted: usize,
    pub watermark_before: Option<u64>,
    pub watermark_after: Option<u64>,
    /// No change-request above the watermark; nothing was written.
    pub nothing_new: bool,
    /// Set when the run aborted.
    pub failure: Option<String>,
}

impl RunSummary {
    pub fn new(run_id: impl Into<String>, mode: RunMode) -> Self {
        Self {
            run_id: run_id.into(),
            mode,
            listed: 0,
            already_processed: 0,
            processed: 0,
            skipped_unavailable: 0,
            skipped_malformed: 0,
            candidates: 0,
            duplicates_collapsed: 0,
            verdicts: VerdictTally::default(),
            pruned: 0,
            replaced: 0,
            emitted: 0,
            watermark_before: None,
            watermark_after: None,
            nothing_new: false,
            failure: None,
        }
    }

    /// Summary with a fresh v4 run id.
    pub fn start(mode: RunMode) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), mode)
    }

    pub fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::Unavailable => self.skipped_unavailable += 1,
            SkipReason::Malformed => self.skipped_malformed += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped_unavailable + self.skipped_malformed
    }

    pub fn matched(&self) -> usize {
        self.verdicts.matched()
    }

    pub fn unmatched(&self) -> usize {
        self.verdicts.unmatched()
    }

    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    /// Emit the counters as one structured `info!` event.
    pub fn log(&self) {
        tracing::info!(
            event = "run.summary",
            run_id = %self.run_id,
            mode = %self.mode,
            listed = self.listed,
            processed = self.processed,
            skipped = self.skipped(),
            candidates = self.candidates,
            matched = self.matched(),
            unmatched = self.unmatched(),
            emitted = self.emitted,
            success = self.succeeded(),
        );
    }

    /// Plain-text rendering for the terminal.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Run {} ({} mode)\n", self.run_id, self.mode));
        if let Some(failure) = &self.failure {
            out.push_str(&format!("  FAILED: {failure}\n"));
        }
        out.push_str("Change-requests:\n");
        out.push_str(&format!(
            "  listed: {}\n  already processed: {}\n  processed: {}\n  skipped: {} (unavailable: {}, malformed: {})\n",
            self.listed,
            self.already_processed,
            self.processed,
            self.skipped(),
            self.skipped_unavailable,
            self.skipped_malformed
        ));
        out.push_str("Entries:\n");
        out.push_str(&format!(
            "  candidates: {}\n  duplicates collapsed: {}\n  matched: {} (owner: {}, owner+title: {}, name fallback: {})\n  unmatched: {} (owner has several: {}, no match: {})\n",
            self.candidates,
            self.duplicates_collapsed,
            self.matched(),
            self.verdicts.owner_match,
            self.verdicts.owner_title_match,
            self.verdicts.name_fallback_match,
            self.unmatched(),
            self.verdicts.unmatched_owner_multiple,
            self.verdicts.unmatched_no_match
        ));
        if self.mode == RunMode::Incremental {
            out.push_str(&format!(
                "  replaced: {}\n  pruned: {}\n",
                self.replaced, self.pruned
            ));
        }
        out.push_str(&format!("  emitted: {}\n", self.emitted));
        if self.nothing_new {
            out.push_str("Nothing new since the last run.\n");
        }
        if self.mode == RunMode::Incremental {
            out.push_str(&format!(
                "Watermark: {} -> {}\n",
                display_mark(self.watermark_before),
                display_mark(self.watermark_after)
            ));
        }
        out
    }
}

fn display_mark(mark: Option<u64>) -> String {
    mark.map(|m| format!("#{m}")).unwrap_or_else(|| "none".to_string())
}
