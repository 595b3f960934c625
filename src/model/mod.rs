//! Core data types for `jira_bulk_edit`.
//!
//! This module defines the fundamental types used throughout the application:
//! - `Issue` - One record fetched from the issue store
//! - `LabelSet` - Ordered set of unique strings (labels field semantics)
//! - `Batch` - One page returned by a search call
//! - `FieldUpdate` - Mutation payload for a single field
//! - `RunCounters` / `ProcessResult` / `Outcome` - Per-run and per-issue results

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Default source field (short text holding the submission number).
pub const DEFAULT_SOURCE_FIELD: &str = "customfield_10213";
/// Default target field (labels list of submission numbers).
pub const DEFAULT_TARGET_FIELD: &str = "customfield_10683";
/// Default human-readable field.
pub const DEFAULT_SUMMARY_FIELD: &str = "summary";

/// Field identifiers the run reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNames {
    pub source: String,
    pub target: String,
    pub summary: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE_FIELD.to_string(),
            target: DEFAULT_TARGET_FIELD.to_string(),
            summary: DEFAULT_SUMMARY_FIELD.to_string(),
        }
    }
}

impl FieldNames {
    /// Fields to request from the store on every search.
    #[must_use]
    pub fn requested(&self) -> Vec<String> {
        vec![
            self.source.clone(),
            self.target.clone(),
            self.summary.clone(),
        ]
    }
}

/// Ordered set of unique strings.
///
/// Insertion order is preserved; inserting a value already present is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LabelSet(Vec<String>);

impl LabelSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|existing| existing == value)
    }

    /// Insert a value, returning `true` if it was not already present.
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.contains(&value) {
            return false;
        }
        self.0.push(value);
        true
    }

    /// Set union with a single value; `self` is left untouched.
    #[must_use]
    pub fn union_with(&self, value: &str) -> Self {
        let mut merged = self.clone();
        merged.insert(value);
        merged
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<'de> Deserialize<'de> for LabelSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Option::<Vec<String>>::deserialize(deserializer)?;
        Ok(values.unwrap_or_default().into_iter().collect())
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// One issue as seen by the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    #[serde(default)]
    pub source_value: Option<String>,
    #[serde(default)]
    pub target_values: LabelSet,
    #[serde(default)]
    pub summary: Option<String>,
}

impl Issue {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source_value: None,
            target_values: LabelSet::new(),
            summary: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, value: impl Into<String>) -> Self {
        self.source_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_targets<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_values = values.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    pub issues: Vec<Issue>,
    /// Server's estimate of total matches; `None` when unknown.
    pub reported_total: Option<u64>,
}

impl Batch {
    /// Build a batch, treating a reported total of zero as unknown.
    #[must_use]
    pub fn new(issues: Vec<Issue>, reported_total: Option<u64>) -> Self {
        Self {
            issues,
            reported_total: reported_total.filter(|total| *total > 0),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }
}

/// Replacement value for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldUpdate {
    pub field: String,
    pub values: LabelSet,
}

/// What happened to a single issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Mutation issued and accepted.
    Updated,
    /// Dry run: mutation computed but not issued.
    WouldUpdate,
    /// Target already holds the value.
    AlreadyPresent,
    /// Source field absent or blank.
    NoSourceValue,
    /// Source value does not match the pattern.
    InvalidSource,
    /// Store rejected the mutation.
    MutationFailed,
}

/// Counter bucket an outcome lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Updated,
    Skipped,
    Error,
}

impl Outcome {
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Updated | Self::WouldUpdate | Self::AlreadyPresent)
    }

    #[must_use]
    pub const fn disposition(self) -> Disposition {
        match self {
            Self::Updated => Disposition::Updated,
            Self::WouldUpdate | Self::AlreadyPresent | Self::NoSourceValue | Self::InvalidSource => {
                Disposition::Skipped
            }
            Self::MutationFailed => Disposition::Error,
        }
    }
}

/// Per-issue processing result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessResult {
    pub key: String,
    pub outcome: Outcome,
    pub success: bool,
    pub updated: bool,
    pub message: String,
    pub source_value: Option<String>,
}

impl ProcessResult {
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        outcome: Outcome,
        source_value: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            outcome,
            success: outcome.is_success(),
            updated: matches!(outcome, Outcome::Updated),
            message: message.into(),
            source_value,
        }
    }
}

/// Terminal counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    pub processed: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl RunCounters {
    /// Count one non-duplicate issue.
    pub fn record(&mut self, outcome: Outcome) {
        self.processed += 1;
        match outcome.disposition() {
            Disposition::Updated => self.updated += 1,
            Disposition::Skipped => self.skipped += 1,
            Disposition::Error => self.errors += 1,
        }
    }
}
