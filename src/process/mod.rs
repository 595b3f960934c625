//! Per-issue copy of the submission number into the target labels field.
//!
//! Every branch is terminal for the issue: failures become a
//! [`ProcessResult`], never an error, so one bad issue cannot abort the run.

use crate::model::{FieldNames, FieldUpdate, Issue, Outcome, ProcessResult};
use crate::store::IssueStore;
use crate::validation::{PATTERN_DISPLAY, SubmissionNumber};
use tracing::{error, info, warn};

/// Validates the source field and writes it into the target field.
#[derive(Debug, Clone)]
pub struct RecordProcessor {
    fields: FieldNames,
}

impl RecordProcessor {
    #[must_use]
    pub fn new(fields: FieldNames) -> Self {
        Self { fields }
    }

    /// Process one issue. With `dry_run` the store is never mutated.
    pub fn process(
        &self,
        issue: &Issue,
        store: &mut dyn IssueStore,
        dry_run: bool,
    ) -> ProcessResult {
        let key = issue.key.as_str();
        let source = issue.source_value.clone();

        let Some(raw) = source.as_deref().filter(|value| !value.is_empty()) else {
            let message = format!("No value in {}", self.fields.source);
            info!("{key}: {message}");
            return ProcessResult::new(key, Outcome::NoSourceValue, source, message);
        };

        let Some(value) = SubmissionNumber::normalize(raw) else {
            let message = format!(
                "Value '{}' does not match pattern {PATTERN_DISPLAY}",
                raw.trim()
            );
            warn!("{key}: {message}");
            return ProcessResult::new(key, Outcome::InvalidSource, source, message);
        };

        let current = &issue.target_values;
        if !current.is_empty() {
            warn!("{key}: Target field not empty: {current}");
        }
        if current.contains(&value) {
            let message = format!("Value '{value}' already exists in target field");
            info!("{key}: {message}");
            return ProcessResult::new(key, Outcome::AlreadyPresent, source, message);
        }

        let update = FieldUpdate {
            field: self.fields.target.clone(),
            values: current.union_with(&value),
        };

        if dry_run {
            let message = format!(
                "[DRY RUN] Would update {} with: {}",
                update.field, update.values
            );
            info!("{key}: {message}");
            return ProcessResult::new(key, Outcome::WouldUpdate, source, message);
        }

        match store.update(key, &update) {
            Ok(()) => {
                let message = format!("Successfully updated {} with '{value}'", update.field);
                info!("{key}: {message}");
                ProcessResult::new(key, Outcome::Updated, source, message)
            }
            Err(err) => {
                let message = format!("Jira API error: {err}");
                error!("{key}: {message}");
                ProcessResult::new(key, Outcome::MutationFailed, source, message)
            }
        }
    }
}
