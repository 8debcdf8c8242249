//! Pending Plugin Catalog CLI
//!
//! The `pending-plugins` command reconciles the open pull requests of the
//! Obsidian plugin registry into `plugins.json` (attributed submissions) and
//! `unmatched.json` (entries that need manual attribution).
//!
//! Passing `--state-file` switches to incremental mode: only pull requests
//! above the stored watermark are processed and the result is merged into
//! the previous `plugins.json`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pending_core::{
    init_tracing, FsOutputSink, FsWatermarkStore, LogFormat, OutputOrder, ReconcileConfig,
    Reconciler, RunMode, RunSummary, DEFAULT_BASE_BRANCH, DEFAULT_LIST_LIMIT, DEFAULT_REPO,
    DEFAULT_TRACKED_FILE,
};
use registry_source::{
    require_tools, CommandRunner, GhChangeRequestLister, GitRegistryCheckout,
    DEFAULT_COMMAND_TIMEOUT, REQUIRED_TOOLS,
};
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "pending-plugins")]
#[command(author = "Pending Catalog Maintainers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Catalog plugin submissions awaiting review in the Obsidian registry",
    long_about = None
)]
struct Cli {
    /// Directory receiving plugins.json and unmatched.json
    #[arg(short, long, env = "PENDING_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Directory for the registry checkout (default: a temporary directory)
    #[arg(short, long, env = "PENDING_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Watermark state file; enables incremental mode
    #[arg(short, long, env = "PENDING_STATE_FILE")]
    state_file: Option<PathBuf>,

    /// Registry repository (owner/name)
    #[arg(long, env = "PENDING_REPO", default_value = DEFAULT_REPO)]
    repo: String,

    /// Registry document tracked inside the repository
    #[arg(long, env = "PENDING_TRACKED_FILE", default_value = DEFAULT_TRACKED_FILE)]
    tracked_file: String,

    /// Branch holding the accepted registry
    #[arg(long, env = "PENDING_BASE_BRANCH", default_value = DEFAULT_BASE_BRANCH)]
    base_branch: String,

    /// Maximum number of open pull requests to list
    #[arg(long, env = "PENDING_LIMIT", default_value_t = DEFAULT_LIST_LIMIT)]
    limit: usize,

    /// Output ordering (default: discovery for full runs, name for incremental)
    #[arg(long, value_enum, env = "PENDING_ORDER")]
    order: Option<OrderArg>,

    /// Timeout for each gh/git invocation, in seconds (0 disables it)
    #[arg(
        long,
        env = "PENDING_COMMAND_TIMEOUT",
        default_value_t = DEFAULT_COMMAND_TIMEOUT.as_secs()
    )]
    command_timeout: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OrderArg {
    /// Listing order of the owning pull request
    Discovery,
    /// Plugin name, case-insensitive
    Name,
}

impl From<OrderArg> for OutputOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Discovery => OutputOrder::Discovery,
            OrderArg::Name => OutputOrder::Name,
        }
    }
}

impl Cli {
    fn reconcile_config(&self) -> ReconcileConfig {
        ReconcileConfig {
            repo: self.repo.clone(),
            tracked_file: self.tracked_file.clone(),
            base_branch: self.base_branch.clone(),
            list_limit: self.limit,
            order: self.order.map(OutputOrder::from),
        }
    }

    fn mode(&self) -> RunMode {
        if self.state_file.is_some() {
            RunMode::Incremental
        } else {
            RunMode::Full
        }
    }

    fn command_runner(&self) -> CommandRunner {
        CommandRunner::new(Duration::from_secs(self.command_timeout))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(LogFormat::from_json_flag(cli.json), level);

    let mut summary = RunSummary::start(cli.mode());
    let result = cmd_reconcile(&cli, &mut summary).await;
    if let Err(err) = &result {
        if summary.failure.is_none() {
            summary.failure = Some(format!("{err:#}"));
        }
    }
    print!("{}", summary.render());
    result
}

/// Set up the live collaborators and run one reconciliation.
async fn cmd_reconcile(cli: &Cli, summary: &mut RunSummary) -> Result<()> {
    require_tools(REQUIRED_TOOLS)
        .await
        .context("Required external tools are missing")?;

    // A temporary work dir is removed when `_temp_work_dir` drops.
    let (work_dir, _temp_work_dir) = match &cli.work_dir {
        Some(dir) => (dir.clone(), None),
        None => {
            let dir = tempfile::tempdir().context("Failed to create temporary work directory")?;
            (dir.path().to_path_buf(), Some(dir))
        }
    };

    let config = cli.reconcile_config();
    let runner = cli.command_runner();
    let checkout = Arc::new(GitRegistryCheckout::new(&work_dir, &config, runner));
    checkout
        .prepare()
        .await
        .with_context(|| format!("Failed to prepare registry checkout in {}", work_dir.display()))?;

    let mut reconciler = Reconciler::new(
        config.clone(),
        Arc::new(GhChangeRequestLister::new(&config, runner)),
        checkout.clone(),
        checkout,
        Arc::new(FsOutputSink::new(&cli.output_dir)),
    );
    if let Some(state_file) = &cli.state_file {
        reconciler = reconciler.with_watermark(Arc::new(FsWatermarkStore::new(state_file)));
    }

    run_reconciler(&reconciler, summary).await?;
    info!(output_dir = %cli.output_dir.display(), "reconciliation complete");
    Ok(())
}

async fn run_reconciler(reconciler: &Reconciler, summary: &mut RunSummary) -> Result<()> {
    reconciler
        .run(summary)
        .await
        .with_context(|| format!("Reconciliation of {} failed", reconciler.config().repo))
}
