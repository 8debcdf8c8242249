//! Domain models for the pending plugin catalog.
//!
//! - `Entry`: a plugin submission record
//! - `ChangeRequest`: an open pull request against the registry
//! - `PendingError`: setup-level failures

pub mod change_request;
pub mod entry;
pub mod error;

pub use change_request::{ChangeRequest, ListedChangeRequest};
pub use entry::{parse_document, Entry};
pub use error::{PendingError, Result};
