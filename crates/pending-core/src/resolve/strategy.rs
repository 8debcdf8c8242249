//! Attribution stages, evaluated in order until one is decisive.

use crate::domain::{ChangeRequest, Entry};
use crate::resolve::index::ResolutionIndex;
use crate::resolve::verdict::{AttributionVerdict, UnmatchedReason};

/// Title prefix registry submissions conventionally use.
pub const ADD_PLUGIN_MARKER: &str = "add plugin:";

/// Outcome of a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// The stage settled the entry; later stages are not consulted.
    Decided(AttributionVerdict),
    /// The stage does not apply; try the next one.
    Pass,
}

/// One step of the attribution chain.
pub trait AttributionStage: Send + Sync {
    fn name(&self) -> &'static str;

    fn attempt(&self, entry: &Entry, owner: &str, index: &ResolutionIndex) -> StageOutcome;
}

/// Plain substring test: the title carries the add-plugin marker and
/// mentions the plugin name, both compared lower-cased. An empty name is
/// a substring of every title.
pub fn title_names_plugin(cr: &ChangeRequest, name_lower: &str) -> bool {
    let title = cr.title_lower();
    title.contains(ADD_PLUGIN_MARKER) && title.contains(name_lower)
}

/// Owner has exactly one open change-request.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoleOwnerStage;

impl AttributionStage for SoleOwnerStage {
    fn name(&self) -> &'static str {
        "sole_owner"
    }

    fn attempt(&self, _entry: &Entry, owner: &str, index: &ResolutionIndex) -> StageOutcome {
        match index.owned_by(owner).as_slice() {
            [only] => StageOutcome::Decided(AttributionVerdict::OwnerMatch(only.number)),
            _ => StageOutcome::Pass,
        }
    }
}

/// Owner has several open change-requests; pick the first whose title names
/// the plugin. Without a title match the entry is unmatched outright.
#[derive(Debug, Default, Clone, Copy)]
pub struct OwnerTitleStage;

impl AttributionStage for OwnerTitleStage {
    fn name(&self) -> &'static str {
        "owner_title"
    }

    fn attempt(&self, entry: &Entry, owner: &str, index: &ResolutionIndex) -> StageOutcome {
        let owned = index.owned_by(owner);
        if owned.len() < 2 {
            return StageOutcome::Pass;
        }
        let name_lower = entry.name.to_lowercase();
        let verdict = owned
            .iter()
            .find(|cr| title_names_plugin(cr, &name_lower))
            .map(|cr| AttributionVerdict::OwnerTitleMatch(cr.number))
            .unwrap_or(AttributionVerdict::Unmatched(
                UnmatchedReason::OwnerMultipleNoTitleMatch,
            ));
        StageOutcome::Decided(verdict)
    }
}

/// Owner has no open change-request (fork, renamed account); search every
/// title for the plugin name.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameFallbackStage;

impl AttributionStage for NameFallbackStage {
    fn name(&self) -> &'static str {
        "name_fallback"
    }

    fn attempt(&self, entry: &Entry, owner: &str, index: &ResolutionIndex) -> StageOutcome {
        if !index.owned_by(owner).is_empty() {
            return StageOutcome::Pass;
        }
        let name_lower = entry.name.to_lowercase();
        index
            .all()
            .iter()
            .find(|cr| title_names_plugin(cr, &name_lower))
            .map(|cr| StageOutcome::Decided(AttributionVerdict::NameFallbackMatch(cr.number)))
            .unwrap_or(StageOutcome::Pass)
    }
}

/// The standard chain: sole owner, owner + title, global name fallback.
pub fn default_stages() -> Vec<Box<dyn AttributionStage>> {
    vec![
        Box::new(SoleOwnerStage),
        Box::new(OwnerTitleStage),
        Box::new(NameFallbackStage),
    ]
}
