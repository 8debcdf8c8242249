//! Registry snapshots from a partial clone driven by `git`.
//!
//! The checkout lives in the working directory. Snapshot fetches share
//! `FETCH_HEAD`, so they must not run concurrently.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pending_core::{BaselineFetcher, ReconcileConfig, SnapshotFetch, SnapshotFetcher};

use crate::command::CommandRunner;
use crate::error::SourceError;

/// Directory name of the checkout inside the working directory.
pub const CHECKOUT_DIR: &str = "registry";

/// `https://github.com/<owner>/<name>.git`
pub fn github_remote(repo: &str) -> String {
    format!("https://github.com/{repo}.git")
}

/// Ref holding GitHub's test merge of pull request `number`.
pub fn merge_ref(number: u64) -> String {
    format!("pull/{number}/merge")
}

/// Baseline and snapshot source backed by a blobless clone.
#[derive(Debug, Clone)]
pub struct GitRegistryCheckout {
    dir: PathBuf,
    remote: String,
    base_branch: String,
    tracked_file: String,
    runner: CommandRunner,
}

impl GitRegistryCheckout {
    pub fn new(
        work_dir: impl AsRef<Path>,
        config: &ReconcileConfig,
        runner: CommandRunner,
    ) -> Self {
        Self {
            dir: work_dir.as_ref().join(CHECKOUT_DIR),
            remote: github_remote(&config.repo),
            base_branch: config.base_branch.clone(),
            tracked_file: config.tracked_file.clone(),
            runner,
        }
    }

    /// Clone from `remote` instead of GitHub.
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Clone the registry unless a checkout already exists.
    pub async fn prepare(&self) -> Result<(), SourceError> {
        if self.dir.join(".git").exists() {
            tracing::info!(dir = %self.dir.display(), "reusing registry checkout");
            return Ok(());
        }
        if let Some(parent) = self.dir.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let dir = self.dir.to_string_lossy();
        tracing::info!(remote = %self.remote, dir = %dir, "cloning registry");
        let args = [
            "clone",
            "--quiet",
            "--filter=blob:none",
            "--no-checkout",
            self.remote.as_str(),
            &*dir,
        ];
        self.runner.run("git", &args).await?;
        Ok(())
    }

    async fn git(&self, args: &[&str]) -> Result<String, SourceError> {
        let dir = self.dir.to_string_lossy();
        let mut full: Vec<&str> = Vec::with_capacity(args.len() + 2);
        full.push("-C");
        full.push(&dir);
        full.extend_from_slice(args);
        self.runner.run("git", &full).await
    }

    async fn show(&self, revision: &str) -> Result<String, SourceError> {
        let object = format!("{revision}:{}", self.tracked_file);
        self.git(&["show", &object]).await
    }
}

#[async_trait]
impl BaselineFetcher for GitRegistryCheckout {
    async fn fetch_baseline(&self) -> pending_core::Result<String> {
        self.git(&["fetch", "--quiet", "origin", self.base_branch.as_str()])
            .await?;
        let content = self.show(&format!("origin/{}", self.base_branch)).await?;
        Ok(content)
    }
}

#[async_trait]
impl SnapshotFetcher for GitRegistryCheckout {
    async fn fetch_snapshot(&self, number: u64) -> pending_core::Result<SnapshotFetch> {
        // Closed-with-conflict pull requests have no merge ref.
        let reference = merge_ref(number);
        match self.git(&["fetch", "--quiet", "origin", reference.as_str()]).await {
            Ok(_) => {}
            Err(SourceError::CommandFailed { stderr, .. }) => {
                return Ok(SnapshotFetch::Unavailable(format!(
                    "no merge ref for #{number}: {stderr}"
                )))
            }
            Err(other) => return Err(other.into()),
        }
        match self.show("FETCH_HEAD").await {
            Ok(content) => Ok(SnapshotFetch::Content(content)),
            Err(SourceError::CommandFailed { stderr, .. }) => Ok(SnapshotFetch::Unavailable(
                format!("{} missing at #{number}: {stderr}", self.tracked_file),
            )),
            Err(other) => Err(other.into()),
        }
    }
}
