//! Attribution of deduplicated candidates to their originating change-request.
//!
//! Provides:
//! - [`index::ResolutionIndex`]: owner and listing-order lookups over all descriptors
//! - [`strategy::AttributionStage`]: one step of the fallback chain
//! - [`AttributionResolver`]: runs the chain and splits matched from unmatched
//!
//! The resolver is a pure function of the entry and the index; it never
//! looks at [`Candidate::origin`].

pub mod index;
pub mod strategy;
pub mod verdict;

pub use index::ResolutionIndex;
pub use strategy::{
    default_stages, title_names_plugin, AttributionStage, NameFallbackStage, OwnerTitleStage,
    SoleOwnerStage, StageOutcome, ADD_PLUGIN_MARKER,
};
pub use verdict::{AttributionVerdict, UnmatchedEntry, UnmatchedReason};

use serde::{Deserialize, Serialize};

use crate::domain::Entry;
use crate::extract::Candidate;

/// Per-verdict counters for one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictTally {
    pub owner_match: usize,
    pub owner_title_match: usize,
    pub name_fallback_match: usize,
    pub unmatched_owner_multiple: usize,
    pub unmatched_no_match: usize,
}

impl VerdictTally {
    pub fn record(&mut self, verdict: &AttributionVerdict) {
        match verdict {
            AttributionVerdict::OwnerMatch(_) => self.owner_match += 1,
            AttributionVerdict::OwnerTitleMatch(_) => self.owner_title_match += 1,
            AttributionVerdict::NameFallbackMatch(_) => self.name_fallback_match += 1,
            AttributionVerdict::Unmatched(UnmatchedReason::OwnerMultipleNoTitleMatch) => {
                self.unmatched_owner_multiple += 1
            }
            AttributionVerdict::Unmatched(UnmatchedReason::NoMatch) => {
                self.unmatched_no_match += 1
            }
        }
    }

    pub fn matched(&self) -> usize {
        self.owner_match + self.owner_title_match + self.name_fallback_match
    }

    pub fn unmatched(&self) -> usize {
        self.unmatched_owner_multiple + self.unmatched_no_match
    }
}

/// Output of a resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Attributed entries, ascending by the owning change-request's
    /// discovery order.
    pub matched: Vec<Entry>,
    /// Entries that need manual attribution.
    pub unmatched: Vec<UnmatchedEntry>,
    pub tally: VerdictTally,
}

/// Runs the attribution stages in order; the first decisive stage wins.
pub struct AttributionResolver {
    stages: Vec<Box<dyn AttributionStage>>,
}

impl Default for AttributionResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributionResolver {
    /// Resolver with the standard stage chain.
    pub fn new() -> Self {
        Self::with_stages(default_stages())
    }

    pub fn with_stages(stages: Vec<Box<dyn AttributionStage>>) -> Self {
        Self { stages }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Resolve one entry.
    pub fn resolve(&self, entry: &Entry, index: &ResolutionIndex) -> AttributionVerdict {
        let owner = entry.owner();
        for stage in &self.stages {
            if let StageOutcome::Decided(verdict) = stage.attempt(entry, &owner, index) {
                tracing::trace!(id = %entry.id, stage = stage.name(), ?verdict, "stage decided");
                return verdict;
            }
        }
        AttributionVerdict::Unmatched(UnmatchedReason::NoMatch)
    }

    /// Resolve every candidate and order the matched entries by discovery
    /// order of their owning change-request.
    pub fn resolve_all(&self, candidates: Vec<Candidate>, index: &ResolutionIndex) -> Resolution {
        let mut tally = VerdictTally::default();
        let mut ranked = Vec::with_capacity(candidates.len());
        let mut unmatched = Vec::new();

        for Candidate { entry, .. } in candidates {
            let verdict = self.resolve(&entry, index);
            let placed = verdict
                .number()
                .and_then(|number| index.discovery_order(number).map(|rank| (rank, number)));
            match (verdict, placed) {
                (AttributionVerdict::Unmatched(status), _) => {
                    tally.record(&AttributionVerdict::Unmatched(status));
                    unmatched.push(UnmatchedEntry { entry, status });
                }
                (verdict, Some((rank, number))) => {
                    tally.record(&verdict);
                    ranked.push((rank, entry.attributed_to(number)));
                }
                (verdict, None) => {
                    // Only custom stages can name a change-request outside the index.
                    tracing::warn!(
                        id = %entry.id,
                        ?verdict,
                        "attributed to an unlisted change-request"
                    );
                    let status = UnmatchedReason::NoMatch;
                    tally.record(&AttributionVerdict::Unmatched(status));
                    unmatched.push(UnmatchedEntry { entry, status });
                }
            }
        }

        // Stable: entries of the same change-request keep candidate order.
        ranked.sort_by_key(|(rank, _)| *rank);

        Resolution {
            matched: ranked.into_iter().map(|(_, entry)| entry).collect(),
            unmatched,
            tally,
        }
    }
}
