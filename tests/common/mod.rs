#![allow(dead_code)]

use jira_bulk_edit::error::{BulkEditError, Result};
use jira_bulk_edit::model::{Batch, FieldUpdate, Issue};
use jira_bulk_edit::store::{IssueStore, SearchRequest};
use std::collections::HashMap;
use std::sync::Once;

pub mod cli;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        jira_bulk_edit::logging::init_test_logging();
    });
}

/// `count` issues `ES-1..` each carrying a valid submission number.
pub fn valid_issues(count: usize) -> Vec<Issue> {
    (1..=count)
        .map(|i| {
            Issue::new(format!("ES-{i}"))
                .with_source(format!("S-{}", 20_000 + i))
                .with_summary(format!("Submission {i}"))
        })
        .collect()
}

/// Store answering searches from a fixed script keyed by offset.
///
/// Offsets without an entry return an empty page; offsets listed in
/// `failing_offsets` return a transport error.
#[derive(Default)]
pub struct ScriptedStore {
    pages: HashMap<usize, Vec<Issue>>,
    failing_offsets: Vec<usize>,
    reported_total: Option<u64>,
    pub searches: Vec<(usize, usize)>,
    pub updates: Vec<(String, Vec<String>)>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, offset: usize, issues: Vec<Issue>) -> Self {
        self.pages.insert(offset, issues);
        self
    }

    pub fn fail_at(mut self, offset: usize) -> Self {
        self.failing_offsets.push(offset);
        self
    }

    pub fn total(mut self, total: u64) -> Self {
        self.reported_total = Some(total);
        self
    }

    pub fn updated_keys(&self) -> Vec<&str> {
        self.updates.iter().map(|(key, _)| key.as_str()).collect()
    }
}

impl IssueStore for ScriptedStore {
    fn search(&mut self, request: &SearchRequest) -> Result<Batch> {
        self.searches.push((request.offset, request.limit));
        if self.failing_offsets.contains(&request.offset) {
            return Err(BulkEditError::Transport {
                method: "POST".to_string(),
                endpoint: "scripted://search".to_string(),
                status: 503,
                body: "Service Unavailable".to_string(),
            });
        }
        let issues = self
            .pages
            .get(&request.offset)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .take(request.limit)
            .collect();
        Ok(Batch::new(issues, self.reported_total))
    }

    fn update(&mut self, key: &str, update: &FieldUpdate) -> Result<()> {
        self.updates
            .push((key.to_string(), update.values.as_slice().to_vec()));
        Ok(())
    }
}
