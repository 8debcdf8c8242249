//! Open change-requests (pull requests) against the plugin registry.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A change-request as reported by the lister, before discovery order is
/// assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedChangeRequest {
    pub number: u64,
    pub owner_login: String,
    pub title: String,
}

impl ListedChangeRequest {
    pub fn new(number: u64, owner_login: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            number,
            owner_login: owner_login.into(),
            title: title.into(),
        }
    }
}

/// Read-only descriptor of one open change-request.
///
/// `discovery_order` is the position in the fetched listing and is never
/// recomputed; it is the tie-break and the discovery sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub number: u64,
    /// Lower-cased login of the change-request author.
    pub owner_login: String,
    pub title: String,
    pub discovery_order: usize,
}

impl ChangeRequest {
    /// Assign discovery order to a listing.
    ///
    /// Listing order is preserved. A repeated `number` keeps its first
    /// position; later repeats are dropped.
    pub fn discover(listing: Vec<ListedChangeRequest>) -> Vec<ChangeRequest> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(listing.len());
        for listed in listing {
            if !seen.insert(listed.number) {
                tracing::debug!(number = listed.number, "dropping repeated change-request");
                continue;
            }
            out.push(ChangeRequest {
                number: listed.number,
                owner_login: listed.owner_login.trim().to_lowercase(),
                title: listed.title,
                discovery_order: out.len(),
            });
        }
        out
    }

    /// Lower-cased title, used by the title heuristics.
    pub fn title_lower(&self) -> String {
        self.title.to_lowercase()
    }
}
