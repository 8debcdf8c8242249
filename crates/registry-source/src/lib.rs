//! Registry Source: `gh` and `git` adapters for the pending plugin catalog
//!
//! Implements the collaborator traits of `pending-core` against a live
//! GitHub registry repository:
//!
//! - [`GhChangeRequestLister`]: open pull requests touching the tracked file
//! - [`GitRegistryCheckout`]: baseline and merge-ref snapshots from a partial clone
//! - [`require_tools`]: setup check for the external tools

pub mod command;
pub mod error;
pub mod gh;
pub mod git;
pub mod tooling;

pub use command::{CommandRunner, DEFAULT_COMMAND_TIMEOUT};
pub use error::SourceError;
pub use gh::{parse_pr_list, GhChangeRequestLister};
pub use git::{github_remote, merge_ref, GitRegistryCheckout, CHECKOUT_DIR};
pub use tooling::{is_tool_available, require_tools, REQUIRED_TOOLS};
