//! Collapse candidates that share an id.

use std::collections::HashSet;

use crate::extract::Candidate;

/// Result of deduplicating the candidates of a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduplicated {
    /// One representative per id, in first-seen order.
    pub candidates: Vec<Candidate>,
    /// Number of candidates dropped because their id was already taken.
    pub collapsed: usize,
}

/// Keep the first candidate seen for every id.
///
/// Input is expected in discovery order of the originating change-requests,
/// so the representative comes from the earliest listed change-request. Which
/// duplicate survives does not affect attribution; the resolver re-derives
/// the owning change-request from the entry itself.
pub fn dedupe(candidates: Vec<Candidate>) -> Deduplicated {
    let mut seen = HashSet::with_capacity(candidates.len());
    let mut kept = Vec::with_capacity(candidates.len());
    let mut collapsed = 0;

    for candidate in candidates {
        if seen.insert(candidate.entry.id.clone()) {
            kept.push(candidate);
        } else {
            tracing::debug!(
                id = %candidate.entry.id,
                origin = candidate.origin,
                "collapsing duplicate candidate"
            );
            collapsed += 1;
        }
    }

    Deduplicated {
        candidates: kept,
        collapsed,
    }
}
