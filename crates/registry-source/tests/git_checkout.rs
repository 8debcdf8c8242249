//! GitRegistryCheckout against a local origin repository.
//!
//! The origin carries a `refs/pull/<n>/merge` ref the way GitHub does, so
//! the fetch paths are exercised without network access. Skipped when `git`
//! is not installed.

use std::path::Path;
use std::process::Command;

use pending_core::{BaselineFetcher, ReconcileConfig, SnapshotFetch, SnapshotFetcher};
use registry_source::{is_tool_available, CommandRunner, GitRegistryCheckout};

const TRACKED: &str = "community-plugins.json";

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn commit_file(dir: &Path, content: &str, message: &str) -> String {
    std::fs::write(dir.join(TRACKED), content).unwrap();
    git(dir, &["add", TRACKED]);
    git(dir, &["commit", "--quiet", "-m", message]);
    git(dir, &["rev-parse", "HEAD"])
}

/// Origin with `master` holding `[a]` and pull request 7 adding `b`.
fn origin(root: &Path) -> std::path::PathBuf {
    let dir = root.join("origin");
    std::fs::create_dir_all(&dir).unwrap();
    git(&dir, &["init", "--quiet"]);
    git(&dir, &["symbolic-ref", "HEAD", "refs/heads/master"]);
    commit_file(&dir, r#"[{"id":"a"}]"#, "baseline");
    git(&dir, &["checkout", "--quiet", "-b", "submission"]);
    let merge = commit_file(&dir, r#"[{"id":"a"},{"id":"b"}]"#, "Add plugin: B");
    git(&dir, &["update-ref", "refs/pull/7/merge", &merge]);
    git(&dir, &["checkout", "--quiet", "master"]);
    dir
}

fn checkout(root: &Path, origin: &Path) -> GitRegistryCheckout {
    GitRegistryCheckout::new(
        root.join("work"),
        &ReconcileConfig::default(),
        CommandRunner::default(),
    )
        .with_remote(origin.to_string_lossy())
}

#[tokio::test]
async fn test_baseline_and_snapshots_from_local_origin() {
    if !is_tool_available("git").await {
        return;
    }
    let root = tempfile::tempdir().unwrap();
    let origin = origin(root.path());
    let checkout = checkout(root.path(), &origin);

    checkout.prepare().await.unwrap();
    assert!(checkout.dir().join(".git").exists());

    let baseline = checkout.fetch_baseline().await.unwrap();
    assert_eq!(baseline, r#"[{"id":"a"}]"#);

    match checkout.fetch_snapshot(7).await.unwrap() {
        SnapshotFetch::Content(content) => assert!(content.contains(r#""id":"b""#)),
        other => panic!("expected content, got {other:?}"),
    }

    match checkout.fetch_snapshot(8).await.unwrap() {
        SnapshotFetch::Unavailable(detail) => assert!(detail.contains("#8")),
        other => panic!("expected unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_prepare_reuses_existing_checkout() {
    if !is_tool_available("git").await {
        return;
    }
    let root = tempfile::tempdir().unwrap();
    let origin = origin(root.path());
    let checkout = checkout(root.path(), &origin);

    checkout.prepare().await.unwrap();
    checkout.prepare().await.unwrap();
    assert!(checkout.fetch_baseline().await.is_ok());
}

#[tokio::test]
async fn test_unreachable_remote_fails_prepare() {
    if !is_tool_available("git").await {
        return;
    }
    let root = tempfile::tempdir().unwrap();
    let checkout = checkout(root.path(), &root.path().join("missing-origin"));
    assert!(checkout.prepare().await.is_err());
}
