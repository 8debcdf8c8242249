//! Candidate extraction: entries a change-request adds on top of the baseline.

use serde::{Deserialize, Serialize};

use crate::baseline::BaselineSet;
use crate::domain::{parse_document, Entry};

/// An entry found in a change-request snapshot but not in the baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub entry: Entry,
    /// Change-request whose snapshot produced this candidate. Only a hint;
    /// attribution is derived independently by the resolver.
    pub origin: u64,
}

/// Why a change-request contributed no candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No merge ref, tracked file missing, or the fetch itself failed.
    Unavailable,
    /// The snapshot is not a JSON array (e.g. conflict markers).
    Malformed,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Unavailable => write!(f, "unavailable"),
            SkipReason::Malformed => write!(f, "malformed"),
        }
    }
}

/// Outcome of extracting one change-request snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Candidates(Vec<Candidate>),
    Skipped { reason: SkipReason, detail: String },
}

impl Extraction {
    pub fn unavailable(detail: impl Into<String>) -> Self {
        Extraction::Skipped {
            reason: SkipReason::Unavailable,
            detail: detail.into(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Extraction::Skipped { .. })
    }

    /// Candidates, or an empty list for a skipped change-request.
    pub fn into_candidates(self) -> Vec<Candidate> {
        match self {
            Extraction::Candidates(candidates) => candidates,
            Extraction::Skipped { .. } => Vec::new(),
        }
    }
}

/// Extract the entries of `content` whose id is not in `baseline`.
///
/// Records that are not objects or have no id are ignored. A document that
/// does not parse as an array makes the change-request skipped.
pub fn extract_candidates(origin: u64, content: &str, baseline: &BaselineSet) -> Extraction {
    let records = match parse_document(content) {
        Ok(records) => records,
        Err(detail) => {
            return Extraction::Skipped {
                reason: SkipReason::Malformed,
                detail,
            }
        }
    };

    let candidates = records
        .iter()
        .filter_map(Entry::from_record)
        .filter(|entry| !baseline.contains(&entry.id))
        .map(|entry| Candidate { entry, origin })
        .collect();

    Extraction::Candidates(candidates)
}
