//! In-process issue store.
//!
//! Mirrors the live query's shape: only issues whose target field is empty
//! match, so a successful update removes the issue from later searches.

use super::{IssueStore, SearchRequest};
use crate::error::{BulkEditError, Result};
use crate::model::{Batch, FieldUpdate, Issue};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// One call observed by a `MemoryStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Search { offset: usize, limit: usize },
    Update { key: String, values: Vec<String> },
}

type MatchFn = Box<dyn Fn(&Issue) -> bool + Send>;

/// Deterministic store backed by a `Vec<Issue>`.
pub struct MemoryStore {
    issues: Vec<Issue>,
    matches: MatchFn,
    failing_updates: HashSet<String>,
    reported_total: Option<Option<u64>>,
    max_page: Option<usize>,
    calls: Vec<StoreCall>,
}

impl MemoryStore {
    /// Store whose query matches issues with an empty target field.
    #[must_use]
    pub fn new(issues: Vec<Issue>) -> Self {
        Self {
            issues,
            matches: Box::new(|issue| issue.target_values.is_empty()),
            failing_updates: HashSet::new(),
            reported_total: None,
            max_page: None,
            calls: Vec::new(),
        }
    }

    /// Load issues from a JSON array on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON array of
    /// issues.
    pub fn from_fixture(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let issues: Vec<Issue> = serde_json::from_str(&contents)?;
        Ok(Self::new(issues))
    }

    /// Replace the query predicate.
    #[must_use]
    pub fn with_filter(mut self, matches: impl Fn(&Issue) -> bool + Send + 'static) -> Self {
        self.matches = Box::new(matches);
        self
    }

    /// Reject updates to `key` with a store error.
    #[must_use]
    pub fn fail_updates_for(mut self, key: impl Into<String>) -> Self {
        self.failing_updates.insert(key.into());
        self
    }

    /// Report a fixed total on every search instead of the live count.
    #[must_use]
    pub fn with_reported_total(mut self, total: Option<u64>) -> Self {
        self.reported_total = Some(total);
        self
    }

    /// Cap the number of issues a single search returns.
    #[must_use]
    pub fn with_max_page(mut self, max_page: usize) -> Self {
        self.max_page = Some(max_page);
        self
    }

    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    #[must_use]
    pub fn issue(&self, key: &str) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.key == key)
    }

    #[must_use]
    pub fn calls(&self) -> &[StoreCall] {
        &self.calls
    }

    #[must_use]
    pub fn search_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, StoreCall::Search { .. }))
            .count()
    }

    #[must_use]
    pub fn update_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, StoreCall::Update { .. }))
            .count()
    }
}

impl IssueStore for MemoryStore {
    fn search(&mut self, request: &SearchRequest) -> Result<Batch> {
        self.calls.push(StoreCall::Search {
            offset: request.offset,
            limit: request.limit,
        });

        let matching: Vec<&Issue> = self
            .issues
            .iter()
            .filter(|&issue| (self.matches)(issue))
            .collect();
        let limit = self
            .max_page
            .map_or(request.limit, |max| request.limit.min(max));
        let page = matching
            .iter()
            .skip(request.offset)
            .take(limit)
            .map(|issue| (*issue).clone())
            .collect();
        let total = self
            .reported_total
            .unwrap_or(Some(matching.len() as u64));

        Ok(Batch::new(page, total))
    }

    fn update(&mut self, key: &str, update: &FieldUpdate) -> Result<()> {
        self.calls.push(StoreCall::Update {
            key: key.to_string(),
            values: update.values.as_slice().to_vec(),
        });

        if self.failing_updates.contains(key) {
            return Err(BulkEditError::Transport {
                method: "PUT".to_string(),
                endpoint: format!("memory://issue/{key}"),
                status: 400,
                body: format!("Field '{}' cannot be set", update.field),
            });
        }

        let issue = self
            .issues
            .iter_mut()
            .find(|issue| issue.key == key)
            .ok_or_else(|| BulkEditError::Transport {
                method: "PUT".to_string(),
                endpoint: format!("memory://issue/{key}"),
                status: 404,
                body: "Issue does not exist".to_string(),
            })?;
        issue.target_values = update.values.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LabelSet;

    fn request(offset: usize, limit: usize) -> SearchRequest {
        SearchRequest {
            query: "target is empty".to_string(),
            offset,
            limit,
            fields: Vec::new(),
        }
    }

    #[test]
    fn test_search_pages_over_matching_issues() {
        let mut store = MemoryStore::new(vec![
            Issue::new("ES-1"),
            Issue::new("ES-2").with_targets(["S-11111"]),
            Issue::new("ES-3"),
        ]);

        let batch = store.search(&request(0, 10)).unwrap();
        let keys: Vec<_> = batch.issues.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, ["ES-1", "ES-3"]);
        assert_eq!(batch.reported_total, Some(2));

        let batch = store.search(&request(1, 10)).unwrap();
        assert_eq!(batch.issues[0].key, "ES-3");
    }

    #[test]
    fn test_update_removes_issue_from_result_set() {
        let mut store = MemoryStore::new(vec![Issue::new("ES-1"), Issue::new("ES-2")]);
        let update = FieldUpdate {
            field: "customfield_10683".to_string(),
            values: LabelSet::from_iter(["S-12345"]),
        };
        store.update("ES-1", &update).unwrap();

        let batch = store.search(&request(0, 10)).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.issues[0].key, "ES-2");
        assert_eq!(store.search_count(), 1);
        assert_eq!(store.update_count(), 1);
    }

    #[test]
    fn test_failing_update_leaves_issue_untouched() {
        let mut store = MemoryStore::new(vec![Issue::new("ES-1")]).fail_updates_for("ES-1");
        let update = FieldUpdate {
            field: "customfield_10683".to_string(),
            values: LabelSet::from_iter(["S-12345"]),
        };
        assert!(store.update("ES-1", &update).is_err());
        assert!(store.issue("ES-1").unwrap().target_values.is_empty());
    }

    #[test]
    fn test_max_page_truncates() {
        let mut store = MemoryStore::new(vec![
            Issue::new("ES-1"),
            Issue::new("ES-2"),
            Issue::new("ES-3"),
        ])
        .with_max_page(2);
        assert_eq!(store.search(&request(0, 10)).unwrap().len(), 2);
    }
}
