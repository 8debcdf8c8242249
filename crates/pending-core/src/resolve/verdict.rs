//! Attribution outcomes.

use serde::{Deserialize, Serialize};

use crate::domain::Entry;

/// Why an entry could not be attributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    /// The owner has several open change-requests and none of their titles
    /// names the plugin.
    OwnerMultipleNoTitleMatch,
    /// No change-request by the owner, and no title anywhere names the plugin.
    NoMatch,
}

impl UnmatchedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnmatchedReason::OwnerMultipleNoTitleMatch => "owner_multiple_no_title_match",
            UnmatchedReason::NoMatch => "no_match",
        }
    }
}

impl std::fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of resolving one entry. Exactly one per entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionVerdict {
    OwnerMatch(u64),
    OwnerTitleMatch(u64),
    NameFallbackMatch(u64),
    Unmatched(UnmatchedReason),
}

impl AttributionVerdict {
    /// Owning change-request number, if matched.
    pub fn number(&self) -> Option<u64> {
        match *self {
            AttributionVerdict::OwnerMatch(n)
            | AttributionVerdict::OwnerTitleMatch(n)
            | AttributionVerdict::NameFallbackMatch(n) => Some(n),
            AttributionVerdict::Unmatched(_) => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.number().is_some()
    }
}

/// A row of the unmatched report: the entry plus its reason code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedEntry {
    #[serde(flatten)]
    pub entry: Entry,
    pub status: UnmatchedReason,
}
