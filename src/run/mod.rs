//! Run orchestration: paginator output feeds the record processor.
//!
//! One run processes one batch at a time and one issue at a time. Counters
//! and the seen set live for the duration of a single [`RunOrchestrator::run`]
//! call. Store search errors abort the run; per-issue failures do not.

use crate::error::Result;
use crate::model::{ProcessResult, RunCounters};
use crate::paginate::{PaginationStats, Paginator, Strategy};
use crate::process::RecordProcessor;
use crate::store::IssueStore;
use crate::util::progress::RunProgress;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Options for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Maximum number of issues to process; `None` means all.
    pub cap: Option<usize>,
    /// Compute updates without issuing them.
    pub dry_run: bool,
    /// Draw a spinner on stderr.
    pub show_progress: bool,
    /// Keep every per-issue result in [`RunReport::results`].
    pub keep_results: bool,
}

/// End-of-run summary.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub counters: RunCounters,
    pub strategy: Strategy,
    pub dry_run: bool,
    pub cap: Option<usize>,
    pub cap_reached: bool,
    pub pagination: PaginationStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Empty unless [`RunOptions::keep_results`] was set.
    #[serde(skip)]
    pub results: Vec<ProcessResult>,
}

impl RunReport {
    /// Issues the first search reported but an offset walk never reached.
    ///
    /// Zero for drains and capped runs, where the gap is expected.
    #[must_use]
    pub fn possibly_skipped(&self) -> usize {
        if self.strategy != Strategy::OffsetWalk || self.cap_reached {
            return 0;
        }
        self.pagination.possibly_skipped()
    }
}

/// Drives a paginator and a processor against one store.
pub struct RunOrchestrator<'a> {
    paginator: &'a mut dyn Paginator,
    processor: &'a RecordProcessor,
    on_result: Option<&'a mut dyn FnMut(&ProcessResult)>,
}

impl<'a> RunOrchestrator<'a> {
    #[must_use]
    pub fn new(paginator: &'a mut dyn Paginator, processor: &'a RecordProcessor) -> Self {
        Self {
            paginator,
            processor,
            on_result: None,
        }
    }

    /// Hand each result to `sink` as soon as the issue is processed.
    #[must_use]
    pub fn on_result(mut self, sink: &'a mut dyn FnMut(&ProcessResult)) -> Self {
        self.on_result = Some(sink);
        self
    }

    /// Run to completion, cap, or the first store search error.
    ///
    /// # Errors
    ///
    /// Returns the store error that aborted pagination.
    pub fn run(&mut self, store: &mut dyn IssueStore, options: RunOptions) -> Result<RunReport> {
        let started_at = Utc::now();
        let mut counters = RunCounters::default();
        let mut results = Vec::new();
        let mut cap_reached = false;
        let progress = RunProgress::new(options.show_progress);

        info!("Mode: {}", if options.dry_run { "DRY RUN" } else { "LIVE UPDATE" });
        info!("Strategy: {}", self.paginator.strategy());

        'batches: loop {
            let remaining = options
                .cap
                .map(|cap| cap.saturating_sub(counters.processed));
            if remaining == Some(0) {
                cap_reached = true;
                break;
            }

            let Some(batch) = self.paginator.next_batch(store, remaining)? else {
                break;
            };
            progress.set_total(self.paginator.stats().last_total);

            for issue in &batch.issues {
                if options.cap.is_some_and(|cap| counters.processed >= cap) {
                    cap_reached = true;
                    break 'batches;
                }
                let position = counters.processed + 1;
                info!(
                    "Processing {position}: {} - {}",
                    issue.key,
                    issue.summary.as_deref().unwrap_or("")
                );

                let result = self.processor.process(issue, store, options.dry_run);
                counters.record(result.outcome);
                progress.tick(&issue.key, &counters);
                if let Some(sink) = self.on_result.as_mut() {
                    sink(&result);
                }
                if options.keep_results {
                    results.push(result);
                }
            }
        }

        progress.finish(&counters);
        let pagination = self.paginator.stats().clone();
        let report = RunReport {
            counters,
            strategy: self.paginator.strategy(),
            dry_run: options.dry_run,
            cap: options.cap,
            cap_reached,
            pagination,
            started_at,
            finished_at: Utc::now(),
            results,
        };
        log_summary(&report);
        Ok(report)
    }
}

fn log_summary(report: &RunReport) {
    let rule = "=".repeat(80);
    info!("{rule}");
    info!("SUMMARY");
    info!("{rule}");
    info!("Total issues processed: {}", report.counters.processed);
    info!("Successfully updated: {}", report.counters.updated);
    info!("Skipped: {}", report.counters.skipped);
    info!("Errors: {}", report.counters.errors);
    info!("{rule}");

    if report.pagination.duplicates > 0 {
        warn!(
            duplicates = report.pagination.duplicates,
            "Search returned issues already seen this run; they were not processed twice"
        );
    }
    let skipped = report.possibly_skipped();
    if skipped > 0 {
        warn!(
            possibly_skipped = skipped,
            "Result set shifted during the offset walk; re-run or use --strategy restart-drain"
        );
    }
    if report.cap_reached {
        info!(cap = ?report.cap, "Stopped at --max-results");
    }
}
