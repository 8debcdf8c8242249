//! Run configuration shared by the pipeline and its adapters.

use serde::{Deserialize, Serialize};

/// Registry repository scanned by default.
pub const DEFAULT_REPO: &str = "obsidianmd/obsidian-releases";
/// Registry document tracked by default.
pub const DEFAULT_TRACKED_FILE: &str = "community-plugins.json";
/// Reference branch holding accepted entries.
pub const DEFAULT_BASE_BRANCH: &str = "master";
/// Upper bound on listed change-requests.
pub const DEFAULT_LIST_LIMIT: usize = 1000;

/// Ordering of the emitted entry document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputOrder {
    /// Ascending discovery order of the owning change-request.
    Discovery,
    /// Case-insensitive plugin name, then id.
    Name,
}

impl std::fmt::Display for OutputOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputOrder::Discovery => write!(f, "discovery"),
            OutputOrder::Name => write!(f, "name"),
        }
    }
}

/// Whether prior output and a watermark take part in the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Full,
    Incremental,
}

impl RunMode {
    /// Ordering used when none is configured: discovery order for full runs,
    /// name order for incremental merges.
    pub fn default_order(&self) -> OutputOrder {
        match self {
            RunMode::Full => OutputOrder::Discovery,
            RunMode::Incremental => OutputOrder::Name,
        }
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Full => write!(f, "full"),
            RunMode::Incremental => write!(f, "incremental"),
        }
    }
}

/// Reconciliation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// `owner/name` of the registry repository.
    pub repo: String,
    /// Path of the registry document inside the repository.
    pub tracked_file: String,
    pub base_branch: String,
    pub list_limit: usize,
    /// Explicit output ordering; `None` picks the mode default.
    pub order: Option<OutputOrder>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            repo: DEFAULT_REPO.to_string(),
            tracked_file: DEFAULT_TRACKED_FILE.to_string(),
            base_branch: DEFAULT_BASE_BRANCH.to_string(),
            list_limit: DEFAULT_LIST_LIMIT,
            order: None,
        }
    }
}

impl ReconcileConfig {
    pub fn with_order(mut self, order: OutputOrder) -> Self {
        self.order = Some(order);
        self
    }

    pub fn effective_order(&self, mode: RunMode) -> OutputOrder {
        self.order.unwrap_or_else(|| mode.default_order())
    }
}
