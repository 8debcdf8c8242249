//! Watermark filtering and id-keyed merging for incremental runs.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::baseline::BaselineSet;
use crate::config::OutputOrder;
use crate::domain::{ChangeRequest, Entry};
use crate::resolve::ResolutionIndex;

/// Keep change-requests numbered above `watermark`, preserving discovery
/// order. `None` keeps everything.
pub fn above_watermark(crs: &[ChangeRequest], watermark: Option<u64>) -> Vec<ChangeRequest> {
    match watermark {
        None => crs.to_vec(),
        Some(mark) => crs.iter().filter(|cr| cr.number > mark).cloned().collect(),
    }
}

/// Highest change-request number in `crs`.
pub fn highest_number(crs: &[ChangeRequest]) -> Option<u64> {
    crs.iter().map(|cr| cr.number).max()
}

/// Result of merging fresh entries into previously emitted output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub entries: Vec<Entry>,
    /// Previous entries overwritten by a fresh entry with the same id.
    pub replaced: usize,
    /// Previous entries dropped because they were accepted since, or carry
    /// no change-request number.
    pub pruned: usize,
}

/// Merge by id; a fresh entry overwrites a previous one with the same id.
///
/// Previous entries whose id is now in the baseline have been accepted and
/// are dropped. The result is unordered; see [`sort_entries`].
pub fn merge_entries(
    previous: Vec<Entry>,
    fresh: Vec<Entry>,
    baseline: &BaselineSet,
) -> MergeOutcome {
    let mut by_id: HashMap<String, Entry> = HashMap::with_capacity(previous.len() + fresh.len());
    let mut pruned = 0;

    for entry in previous {
        if baseline.contains(&entry.id) || entry.change_request_number.is_none() {
            tracing::debug!(id = %entry.id, "pruning previously emitted entry");
            pruned += 1;
            continue;
        }
        by_id.insert(entry.id.clone(), entry);
    }

    let mut replaced = 0;
    for entry in fresh {
        if by_id.insert(entry.id.clone(), entry).is_some() {
            replaced += 1;
        }
    }

    MergeOutcome {
        entries: by_id.into_values().collect(),
        replaced,
        pruned,
    }
}

/// Sort the output document.
///
/// Discovery order uses the index; entries whose change-request is no longer
/// listed go last, by number. Name order compares lower-cased names. Both
/// break ties on id, so the result is deterministic.
pub fn sort_entries(entries: &mut [Entry], order: OutputOrder, index: &ResolutionIndex) {
    match order {
        OutputOrder::Discovery => entries.sort_by(|a, b| {
            let rank = |e: &Entry| {
                e.change_request_number
                    .and_then(|n| index.discovery_order(n))
                    .unwrap_or(usize::MAX)
            };
            rank(a)
                .cmp(&rank(b))
                .then_with(|| a.change_request_number.cmp(&b.change_request_number))
                .then_with(|| a.id.cmp(&b.id))
        }),
        OutputOrder::Name => entries.sort_by(|a, b| by_name(a, b)),
    }
}

fn by_name(a: &Entry, b: &Entry) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.id.cmp(&b.id))
}
