//! Baseline loading: the set of plugin ids already accepted into the registry.

use std::collections::HashSet;

use serde_json::Value;

use crate::domain::{parse_document, Entry, PendingError, Result};

/// Ids of every well-formed record in the reference document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaselineSet {
    ids: HashSet<String>,
    rejected: usize,
}

impl BaselineSet {
    /// Load the baseline from the raw reference document.
    ///
    /// A document that is not a JSON array is a setup failure. Records that
    /// are not objects or lack an `id` are left out of the set so they are
    /// never treated as accepted.
    pub fn load(content: &str) -> Result<Self> {
        let records = parse_document(content).map_err(PendingError::MalformedBaseline)?;
        Ok(Self::from_records(&records))
    }

    pub fn from_records(records: &[Value]) -> Self {
        let mut ids = HashSet::with_capacity(records.len());
        let mut rejected = 0;
        for record in records {
            match Entry::from_record(record) {
                Some(entry) => {
                    ids.insert(entry.id);
                }
                None => rejected += 1,
            }
        }
        if rejected > 0 {
            tracing::debug!(rejected, "baseline records excluded as malformed");
        }
        Self { ids, rejected }
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            rejected: 0,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of records that were excluded as malformed.
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_collects_ids() {
        let baseline = BaselineSet::load(
            r#"[{"id": "a", "name": "A"}, {"id": "b", "name": "B", "repo": "x/b"}]"#,
        )
        .expect("valid baseline");
        assert_eq!(baseline.len(), 2);
        assert!(baseline.contains("a"));
        assert!(baseline.contains("b"));
        assert!(!baseline.contains("c"));
    }

    #[test]
    fn test_malformed_records_are_excluded_not_fatal() {
        let baseline = BaselineSet::load(r#"[{"id": "a"}, {"name": "no id"}, 42, {"id": null}]"#)
            .expect("array parses");
        assert_eq!(baseline.len(), 1);
        assert_eq!(baseline.rejected(), 3);
    }

    #[test]
    fn test_non_array_document_is_setup_failure() {
        let err = BaselineSet::load(r#"{"id": "a"}"#).unwrap_err();
        assert!(matches!(err, PendingError::MalformedBaseline(_)));

        let err = BaselineSet::load("not json").unwrap_err();
        assert!(matches!(err, PendingError::MalformedBaseline(_)));
    }

    #[test]
    fn test_empty_baseline() {
        let baseline = BaselineSet::load("[]").expect("empty array");
        assert!(baseline.is_empty());
    }
}
