//! Incremental runs: watermark handling and id-keyed merging across runs.

use std::sync::Arc;

use pending_core::fakes::{
    MemoryBaseline, MemoryLister, MemorySink, MemorySnapshots, MemoryWatermark,
};
use pending_core::{
    Entry, FsOutputSink, FsWatermarkStore, ListedChangeRequest, ReconcileConfig, Reconciler,
    WatermarkStore,
};

fn attributed(id: &str, name: &str, number: u64) -> Entry {
    Entry::new(id, name, format!("old/{id}")).attributed_to(number)
}

fn incremental(
    listing: Vec<ListedChangeRequest>,
    baseline: &str,
    snapshots: MemorySnapshots,
    sink: Arc<MemorySink>,
    watermark: Arc<MemoryWatermark>,
) -> Reconciler {
    Reconciler::new(
        ReconcileConfig::default(),
        Arc::new(MemoryLister::new(listing)),
        Arc::new(MemoryBaseline::new(baseline)),
        Arc::new(snapshots),
        sink,
    )
    .with_watermark(watermark)
}

#[tokio::test]
async fn test_merge_is_last_write_wins_and_sorted_by_name() {
    let sink = Arc::new(MemorySink::seeded(vec![
        attributed("zen", "Zen Mode", 50),
        attributed("alpha", "Alpha", 51),
    ]));
    let watermark = Arc::new(MemoryWatermark::new(Some(51)));
    let reconciler = incremental(
        vec![ListedChangeRequest::new(60, "rita", "Add plugin: Alpha")],
        "[]",
        MemorySnapshots::new().with(
            60,
            r#"[{"id":"alpha","name":"Alpha","repo":"rita/alpha","description":"new"}]"#,
        ),
        sink.clone(),
        watermark.clone(),
    );

    let mut summary = reconciler.new_summary();
    reconciler.run(&mut summary).await.unwrap();

    let entries = sink.entries();
    assert_eq!(
        entries.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
        vec!["alpha", "zen"]
    );
    assert_eq!(entries[0].change_request_number, Some(60));
    assert_eq!(entries[0].description, "new");
    assert_eq!(summary.replaced, 1);
    assert_eq!(watermark.current(), Some(60));
}

#[tokio::test]
async fn test_accepted_entries_are_pruned() {
    let sink = Arc::new(MemorySink::seeded(vec![
        attributed("merged-since", "Merged Since", 52),
        attributed("still-open", "Still Open", 53),
    ]));
    let watermark = Arc::new(MemoryWatermark::new(Some(53)));
    let reconciler = incremental(
        vec![ListedChangeRequest::new(70, "sam", "Add plugin: New One")],
        r#"[{"id":"merged-since","name":"Merged Since","repo":"old/merged-since"}]"#,
        MemorySnapshots::new().with(
            70,
            r#"[{"id":"new-one","name":"New One","repo":"sam/new-one"}]"#,
        ),
        sink.clone(),
        watermark,
    );

    let mut summary = reconciler.new_summary();
    reconciler.run(&mut summary).await.unwrap();

    let ids: Vec<_> = sink.entries().into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec!["new-one", "still-open"]);
    assert_eq!(summary.pruned, 1);
}

#[tokio::test]
async fn test_nothing_new_leaves_output_and_watermark_alone() {
    let sink = Arc::new(MemorySink::seeded(vec![attributed("kept", "Kept", 80)]));
    let watermark = Arc::new(MemoryWatermark::new(Some(90)));
    let reconciler = incremental(
        vec![ListedChangeRequest::new(80, "tom", "Add plugin: Kept")],
        "[]",
        MemorySnapshots::new(),
        sink.clone(),
        watermark.clone(),
    );

    let mut summary = reconciler.new_summary();
    reconciler.run(&mut summary).await.unwrap();

    assert!(summary.nothing_new);
    assert_eq!(sink.writes(), 0);
    assert_eq!(sink.entries().len(), 1);
    assert_eq!(watermark.current(), Some(90));
    assert!(summary.render().contains("Nothing new since the last run."));
}

#[tokio::test]
async fn test_failed_write_keeps_watermark() {
    let watermark = Arc::new(MemoryWatermark::new(Some(10)));
    let reconciler = Reconciler::new(
        ReconcileConfig::default(),
        Arc::new(MemoryLister::new(vec![ListedChangeRequest::new(
            11,
            "uma",
            "Add plugin: U",
        )])),
        Arc::new(MemoryBaseline::new("[]")),
        Arc::new(MemorySnapshots::new().with(11, r#"[{"id":"u","name":"U","repo":"uma/u"}]"#)),
        Arc::new(MemorySink::failing()),
    )
    .with_watermark(watermark.clone());

    let mut summary = reconciler.new_summary();
    assert!(reconciler.run(&mut summary).await.is_err());
    assert_eq!(watermark.current(), Some(10));
    assert!(summary.failure.is_some());
    assert_eq!(summary.watermark_after, Some(10));
}

#[tokio::test]
async fn test_multi_request_owner_below_watermark_still_counts() {
    // vic's first request was processed in an earlier run; the second one
    // must still be resolved against both titles.
    let sink = Arc::new(MemorySink::new());
    let reconciler = incremental(
        vec![
            ListedChangeRequest::new(100, "vic", "Add plugin: First"),
            ListedChangeRequest::new(101, "vic", "Add plugin: Second"),
        ],
        "[]",
        MemorySnapshots::new().with(
            101,
            r#"[{"id":"first","name":"First","repo":"vic/first"},
                {"id":"second","name":"Second","repo":"vic/second"}]"#,
        ),
        sink.clone(),
        Arc::new(MemoryWatermark::new(Some(100))),
    );

    let mut summary = reconciler.new_summary();
    reconciler.run(&mut summary).await.unwrap();

    let entries = sink.entries();
    let number = |id: &str| {
        entries
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| e.change_request_number)
    };
    assert_eq!(number("first"), Some(100));
    assert_eq!(number("second"), Some(101));
}

#[tokio::test]
async fn test_two_runs_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(FsOutputSink::new(dir.path().join("out")));
    let state = Arc::new(FsWatermarkStore::new(dir.path().join("state.json")));

    let first = Reconciler::new(
        ReconcileConfig::default(),
        Arc::new(MemoryLister::new(vec![ListedChangeRequest::new(
            1,
            "wes",
            "Add plugin: One",
        )])),
        Arc::new(MemoryBaseline::new("[]")),
        Arc::new(MemorySnapshots::new().with(1, r#"[{"id":"one","name":"One","repo":"wes/one"}]"#)),
        sink.clone(),
    )
    .with_watermark(state.clone());
    let mut summary = first.new_summary();
    first.run(&mut summary).await.unwrap();
    assert_eq!(state.load().await.unwrap(), Some(1));

    let second = Reconciler::new(
        ReconcileConfig::default(),
        Arc::new(MemoryLister::new(vec![
            ListedChangeRequest::new(1, "wes", "Add plugin: One"),
            ListedChangeRequest::new(2, "xia", "Add plugin: Two"),
        ])),
        Arc::new(MemoryBaseline::new("[]")),
        Arc::new(MemorySnapshots::new().with(2, r#"[{"id":"two","name":"Two","repo":"xia/two"}]"#)),
        sink.clone(),
    )
    .with_watermark(state.clone());
    let mut summary = second.new_summary();
    second.run(&mut summary).await.unwrap();

    assert_eq!(state.load().await.unwrap(), Some(2));
    let written: Vec<Entry> =
        serde_json::from_str(&std::fs::read_to_string(sink.entries_path()).unwrap()).unwrap();
    assert_eq!(
        written.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
        vec!["one", "two"]
    );
}
