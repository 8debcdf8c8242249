//! Read-only lookup structure over the complete change-request listing.

use std::collections::HashMap;

use crate::domain::ChangeRequest;

/// Owner and listing-order lookups used by every attribution stage.
///
/// Built once from the full descriptor list before any entry is resolved.
#[derive(Debug, Clone, Default)]
pub struct ResolutionIndex {
    descriptors: Vec<ChangeRequest>,
    by_owner: HashMap<String, Vec<usize>>,
    by_number: HashMap<u64, usize>,
}

impl ResolutionIndex {
    pub fn new(descriptors: &[ChangeRequest]) -> Self {
        let mut descriptors = descriptors.to_vec();
        descriptors.sort_by_key(|cr| cr.discovery_order);

        let mut by_owner: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_number = HashMap::with_capacity(descriptors.len());
        for (pos, cr) in descriptors.iter().enumerate() {
            by_number.insert(cr.number, pos);
            if !cr.owner_login.is_empty() {
                by_owner.entry(cr.owner_login.clone()).or_default().push(pos);
            }
        }

        Self {
            descriptors,
            by_owner,
            by_number,
        }
    }

    /// Change-requests opened by `owner`, in listing order. An empty owner
    /// owns nothing.
    pub fn owned_by(&self, owner: &str) -> Vec<&ChangeRequest> {
        self.by_owner
            .get(owner)
            .map(|positions| positions.iter().map(|&pos| &self.descriptors[pos]).collect())
            .unwrap_or_default()
    }

    /// Every change-request, in listing order.
    pub fn all(&self) -> &[ChangeRequest] {
        &self.descriptors
    }

    pub fn get(&self, number: u64) -> Option<&ChangeRequest> {
        self.by_number.get(&number).map(|&pos| &self.descriptors[pos])
    }

    pub fn discovery_order(&self, number: u64) -> Option<usize> {
        self.get(number).map(|cr| cr.discovery_order)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
