//! The reconciliation run: baseline, listing, extraction, deduplication,
//! attribution, and (in incremental mode) watermark filtering and merging.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, Instrument};

use crate::baseline::BaselineSet;
use crate::config::{OutputOrder, ReconcileConfig, RunMode};
use crate::dedupe::dedupe;
use crate::domain::{ChangeRequest, Result};
use crate::extract::{extract_candidates, Extraction};
use crate::incremental::{above_watermark, highest_number, merge_entries, sort_entries};
use crate::obs;
use crate::ports::{
    BaselineFetcher, ChangeRequestLister, OutputSink, SnapshotFetch, SnapshotFetcher,
    WatermarkStore,
};
use crate::resolve::{AttributionResolver, ResolutionIndex};
use crate::summary::RunSummary;

/// Wires the collaborators together and runs one reconciliation pass.
pub struct Reconciler {
    config: ReconcileConfig,
    lister: Arc<dyn ChangeRequestLister>,
    baseline: Arc<dyn BaselineFetcher>,
    snapshots: Arc<dyn SnapshotFetcher>,
    sink: Arc<dyn OutputSink>,
    watermark: Option<Arc<dyn WatermarkStore>>,
    resolver: AttributionResolver,
}

impl Reconciler {
    pub fn new(
        config: ReconcileConfig,
        lister: Arc<dyn ChangeRequestLister>,
        baseline: Arc<dyn BaselineFetcher>,
        snapshots: Arc<dyn SnapshotFetcher>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            config,
            lister,
            baseline,
            snapshots,
            sink,
            watermark: None,
            resolver: AttributionResolver::new(),
        }
    }

    /// Enable incremental mode.
    pub fn with_watermark(mut self, store: Arc<dyn WatermarkStore>) -> Self {
        self.watermark = Some(store);
        self
    }

    pub fn with_resolver(mut self, resolver: AttributionResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn mode(&self) -> RunMode {
        if self.watermark.is_some() {
            RunMode::Incremental
        } else {
            RunMode::Full
        }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Fresh summary with a new run id, ready to pass to [`Reconciler::run`].
    pub fn new_summary(&self) -> RunSummary {
        RunSummary::start(self.mode())
    }

    /// Run once, filling `summary` as the run progresses.
    ///
    /// The summary stays meaningful when an error is returned: it holds the
    /// counters up to the failure and `failure` is set.
    pub async fn run(&self, summary: &mut RunSummary) -> Result<()> {
        let started = Instant::now();
        let run_id = summary.run_id.clone();
        obs::emit_run_started(&run_id, &self.config.repo, self.mode());

        let result = self
            .execute(summary)
            .instrument(obs::run_span(&run_id))
            .await;

        if let Err(err) = &result {
            summary.failure = Some(err.to_string());
        }
        summary.log();
        obs::emit_run_finished(
            &run_id,
            started.elapsed().as_millis() as u64,
            result.is_ok(),
        );
        result
    }

    async fn execute(&self, summary: &mut RunSummary) -> Result<()> {
        let mode = self.mode();

        let document = self.baseline.fetch_baseline().await?;
        let baseline = BaselineSet::load(&document)?;
        debug!(
            ids = baseline.len(),
            rejected = baseline.rejected(),
            "baseline loaded"
        );

        let listing = self.lister.list_change_requests().await?;
        let discovered = ChangeRequest::discover(listing);
        summary.listed = discovered.len();

        let watermark = match &self.watermark {
            Some(store) => store.load().await?,
            None => None,
        };
        summary.watermark_before = watermark;
        summary.watermark_after = watermark;

        let selected = above_watermark(&discovered, watermark);
        summary.already_processed = discovered.len() - selected.len();
        obs::emit_change_requests_listed(discovered.len(), selected.len(), watermark);

        if mode == RunMode::Incremental && selected.is_empty() {
            summary.nothing_new = true;
            return Ok(());
        }

        // Sequential: every snapshot fetch goes through the same checkout.
        let mut candidates = Vec::new();
        for cr in &selected {
            let extraction = match self.snapshots.fetch_snapshot(cr.number).await {
                Ok(SnapshotFetch::Content(content)) => {
                    extract_candidates(cr.number, &content, &baseline)
                }
                Ok(SnapshotFetch::Unavailable(detail)) => Extraction::unavailable(detail),
                Err(err) => Extraction::unavailable(err.to_string()),
            };
            match extraction {
                Extraction::Candidates(found) => {
                    debug!(number = cr.number, candidates = found.len(), "snapshot extracted");
                    summary.processed += 1;
                    candidates.extend(found);
                }
                Extraction::Skipped { reason, detail } => {
                    obs::emit_change_request_skipped(cr.number, reason, &detail);
                    summary.record_skip(reason);
                }
            }
        }
        summary.candidates = candidates.len();

        let deduped = dedupe(candidates);
        summary.duplicates_collapsed = deduped.collapsed;

        // Built from the whole listing so owners with earlier requests below
        // the watermark are still seen as multi-request owners.
        let index = ResolutionIndex::new(&discovered);
        let resolution = self.resolver.resolve_all(deduped.candidates, &index);
        summary.verdicts = resolution.tally;
        for row in &resolution.unmatched {
            obs::emit_entry_unmatched(&row.entry.id, &row.entry.repo, row.status);
        }

        let order = self.config.effective_order(mode);
        let mut entries = match mode {
            RunMode::Full => resolution.matched,
            RunMode::Incremental => {
                let previous = self.sink.load_previous().await?;
                let merged = merge_entries(previous, resolution.matched, &baseline);
                summary.replaced = merged.replaced;
                summary.pruned = merged.pruned;
                merged.entries
            }
        };
        // Resolved entries already come in discovery order, with candidate
        // order inside one change-request.
        if mode == RunMode::Incremental || order != OutputOrder::Discovery {
            sort_entries(&mut entries, order, &index);
        }

        self.sink.write(&entries, &resolution.unmatched).await?;
        summary.emitted = entries.len();
        obs::emit_output_written(entries.len(), resolution.unmatched.len());

        if let Some(store) = &self.watermark {
            if let Some(highest) = highest_number(&selected) {
                store.store(highest).await?;
                summary.watermark_after = Some(highest);
                obs::emit_watermark_advanced(watermark, highest);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ListedChangeRequest;
    use crate::fakes::{MemoryBaseline, MemoryLister, MemorySink, MemorySnapshots, MemoryWatermark};

    fn reconciler(
        lister: MemoryLister,
        baseline: MemoryBaseline,
        snapshots: MemorySnapshots,
        sink: Arc<MemorySink>,
    ) -> Reconciler {
        Reconciler::new(
            ReconcileConfig::default(),
            Arc::new(lister),
            Arc::new(baseline),
            Arc::new(snapshots),
            sink,
        )
    }

    #[tokio::test]
    async fn test_unreachable_baseline_is_fatal() {
        let sink = Arc::new(MemorySink::new());
        let rec = reconciler(
            MemoryLister::new(vec![]),
            MemoryBaseline::unreachable("offline"),
            MemorySnapshots::new(),
            sink.clone(),
        );
        let mut summary = rec.new_summary();
        let err = rec.run(&mut summary).await.unwrap_err();
        assert!(err.to_string().contains("offline"));
        assert!(summary.failure.is_some());
        assert_eq!(sink.writes(), 0);
    }

    #[tokio::test]
    async fn test_malformed_baseline_is_fatal() {
        let sink = Arc::new(MemorySink::new());
        let rec = reconciler(
            MemoryLister::new(vec![]),
            MemoryBaseline::new("<<<<<<< HEAD"),
            MemorySnapshots::new(),
            sink.clone(),
        );
        let mut summary = rec.new_summary();
        assert!(rec.run(&mut summary).await.is_err());
        assert_eq!(sink.writes(), 0);
    }

    #[tokio::test]
    async fn test_listing_failure_is_fatal() {
        let sink = Arc::new(MemorySink::new());
        let rec = reconciler(
            MemoryLister::failing("rate limited"),
            MemoryBaseline::new("[]"),
            MemorySnapshots::new(),
            sink.clone(),
        );
        let mut summary = rec.new_summary();
        assert!(rec.run(&mut summary).await.is_err());
        assert_eq!(summary.listed, 0);
        assert_eq!(sink.writes(), 0);
    }

    #[tokio::test]
    async fn test_skipped_change_requests_are_counted() {
        let sink = Arc::new(MemorySink::new());
        let snapshots = MemorySnapshots::new()
            .with(1, "not json")
            .with_error(2, "fetch refused")
            .with(4, r#"[{"id":"a","name":"A","repo":"dora/a"}]"#);
        let rec = reconciler(
            MemoryLister::new(vec![
                ListedChangeRequest::new(1, "x", "Add plugin: X"),
                ListedChangeRequest::new(2, "y", "Add plugin: Y"),
                ListedChangeRequest::new(3, "z", "Add plugin: Z"),
                ListedChangeRequest::new(4, "dora", "Add plugin: A"),
            ]),
            MemoryBaseline::new("[]"),
            snapshots,
            sink.clone(),
        );
        let mut summary = rec.new_summary();
        rec.run(&mut summary).await.unwrap();

        assert_eq!(summary.listed, 4);
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.skipped_malformed, 1);
        assert_eq!(summary.skipped_unavailable, 2);
        assert_eq!(summary.emitted, 1);
        assert_eq!(sink.entries()[0].change_request_number, Some(4));
    }

    #[tokio::test]
    async fn test_full_mode_writes_even_when_nothing_is_listed() {
        let sink = Arc::new(MemorySink::new());
        let rec = reconciler(
            MemoryLister::new(vec![]),
            MemoryBaseline::new("[]"),
            MemorySnapshots::new(),
            sink.clone(),
        );
        let mut summary = rec.new_summary();
        rec.run(&mut summary).await.unwrap();
        assert_eq!(sink.writes(), 1);
        assert!(!summary.nothing_new);
    }

    #[tokio::test]
    async fn test_name_order_in_full_mode() {
        let sink = Arc::new(MemorySink::new());
        let snapshots = MemorySnapshots::new()
            .with(1, r#"[{"id":"z","name":"Zeta","repo":"ann/zeta"}]"#)
            .with(2, r#"[{"id":"a","name":"alpha","repo":"ben/alpha"}]"#);
        let rec = Reconciler::new(
            ReconcileConfig::default().with_order(OutputOrder::Name),
            Arc::new(MemoryLister::new(vec![
                ListedChangeRequest::new(1, "ann", "Add plugin: Zeta"),
                ListedChangeRequest::new(2, "ben", "Add plugin: alpha"),
            ])),
            Arc::new(MemoryBaseline::new("[]")),
            Arc::new(snapshots),
            sink.clone(),
        );
        let mut summary = rec.new_summary();
        rec.run(&mut summary).await.unwrap();
        let ids: Vec<_> = sink.entries().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["a", "z"]);
    }

    #[tokio::test]
    async fn test_incremental_mode_detected_from_watermark_store() {
        let rec = reconciler(
            MemoryLister::new(vec![]),
            MemoryBaseline::new("[]"),
            MemorySnapshots::new(),
            Arc::new(MemorySink::new()),
        );
        assert_eq!(rec.mode(), RunMode::Full);
        let rec = rec.with_watermark(Arc::new(MemoryWatermark::new(None)));
        assert_eq!(rec.mode(), RunMode::Incremental);
        assert_eq!(rec.new_summary().mode, RunMode::Incremental);
    }
}
