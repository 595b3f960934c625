//! Output formatting for `jira_bulk_edit`.
//!
//! Text renderings of run reports and validator checks. JSON output is the
//! `serde` form of the same types, assembled by the commands.

use crate::model::{Disposition, ProcessResult};
use crate::run::RunReport;
use serde::Serialize;
use std::fmt::Write as _;

/// Width of the summary rule.
const RULE_WIDTH: usize = 80;

/// JSON shape of a finished run.
#[derive(Debug, Serialize)]
pub struct RunOutput<'a> {
    #[serde(flatten)]
    pub report: &'a RunReport,
    pub possibly_skipped: usize,
    pub results: &'a [ProcessResult],
}

impl<'a> RunOutput<'a> {
    #[must_use]
    pub fn new(report: &'a RunReport) -> Self {
        Self {
            report,
            possibly_skipped: report.possibly_skipped(),
            results: &report.results,
        }
    }
}

/// One validator verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckLine {
    pub value: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<String>,
}

/// Short tag for an outcome's counter bucket.
#[must_use]
pub const fn disposition_label(disposition: Disposition) -> &'static str {
    match disposition {
        Disposition::Updated => "updated",
        Disposition::Skipped => "skipped",
        Disposition::Error => "error",
    }
}

/// Format one per-issue line: `KEY  [bucket]  message`.
#[must_use]
pub fn format_result_line(result: &ProcessResult) -> String {
    format!(
        "{:<12} [{}] {}",
        result.key,
        disposition_label(result.outcome.disposition()),
        result.message
    )
}

/// Format the end-of-run summary block.
#[must_use]
pub fn format_summary(report: &RunReport) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let counters = &report.counters;
    let mut out = String::new();

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        "SUMMARY ({}, {})",
        if report.dry_run { "dry run" } else { "live" },
        report.strategy
    );
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Total issues processed: {}", counters.processed);
    let _ = writeln!(out, "Successfully updated: {}", counters.updated);
    let _ = writeln!(out, "Skipped: {}", counters.skipped);
    let _ = writeln!(out, "Errors: {}", counters.errors);

    let stats = &report.pagination;
    if stats.duplicates > 0 {
        let _ = writeln!(out, "Duplicates ignored: {}", stats.duplicates);
    }
    if stats.stalled > 0 {
        let _ = writeln!(out, "Still matching after drain: {}", stats.stalled);
    }
    let skipped = report.possibly_skipped();
    if skipped > 0 {
        let _ = writeln!(out, "Possibly skipped by offset walk: {skipped}");
    }
    if let Some(cap) = report.cap.filter(|_| report.cap_reached) {
        let _ = writeln!(out, "Stopped at --max-results {cap}");
    }
    let _ = writeln!(out, "Searches: {}", stats.fetches);
    let elapsed = report.finished_at - report.started_at;
    let _ = writeln!(
        out,
        "Elapsed: {}.{:03}s",
        elapsed.num_seconds(),
        elapsed.num_milliseconds().rem_euclid(1000)
    );
    out.push_str(&rule);
    out
}

/// Format one validator verdict.
#[must_use]
pub fn format_check_line(line: &CheckLine) -> String {
    if line.valid {
        format!("valid    {}", line.value)
    } else {
        format!("invalid  {}", line.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Outcome, RunCounters};
    use crate::paginate::{PaginationStats, Strategy};
    use chrono::{Duration, Utc};

    fn report(strategy: Strategy) -> RunReport {
        let started_at = Utc::now();
        RunReport {
            counters: RunCounters {
                processed: 4,
                updated: 1,
                skipped: 2,
                errors: 1,
            },
            strategy,
            dry_run: false,
            cap: None,
            cap_reached: false,
            pagination: PaginationStats::default(),
            started_at,
            finished_at: started_at + Duration::milliseconds(1_250),
            results: vec![ProcessResult::new(
                "ES-1",
                Outcome::Updated,
                Some("S-12345".to_string()),
                "Successfully updated customfield_10683 with 'S-12345'",
            )],
        }
    }

    #[test]
    fn test_summary_lists_counters() {
        let text = format_summary(&report(Strategy::RestartDrain));
        assert!(text.contains("SUMMARY (live, restart-drain)"));
        assert!(text.contains("Total issues processed: 4"));
        assert!(text.contains("Successfully updated: 1"));
        assert!(text.contains("Skipped: 2"));
        assert!(text.contains("Errors: 1"));
        assert!(text.contains("Elapsed: 1.250s"));
        assert!(!text.contains("Duplicates"));
    }

    #[test]
    fn test_summary_reports_skips_for_offset_walk() {
        let mut report = report(Strategy::OffsetWalk);
        report.pagination.initial_total = Some(10);
        report.pagination.observed = 6;
        report.pagination.duplicates = 2;
        let text = format_summary(&report);
        assert!(text.contains("Possibly skipped by offset walk: 4"));
        assert!(text.contains("Duplicates ignored: 2"));
    }

    #[test]
    fn test_result_line_names_bucket() {
        let report = report(Strategy::RestartDrain);
        let line = format_result_line(&report.results[0]);
        assert!(line.starts_with("ES-1"));
        assert!(line.contains("[updated]"));
    }

    #[test]
    fn test_run_output_json_flattens_report() {
        let report = report(Strategy::RestartDrain);
        let value = serde_json::to_value(RunOutput::new(&report)).unwrap();
        assert_eq!(value["counters"]["processed"], 4);
        assert_eq!(value["strategy"], "restart-drain");
        assert_eq!(value["results"][0]["outcome"], "updated");
        assert_eq!(value["possibly_skipped"], 0);
    }

    #[test]
    fn test_check_line() {
        let valid = CheckLine {
            value: "S-12345".to_string(),
            valid: true,
            normalized: Some("S-12345".to_string()),
        };
        assert_eq!(format_check_line(&valid), "valid    S-12345");
        let invalid = CheckLine {
            value: "S-1".to_string(),
            valid: false,
            normalized: None,
        };
        assert_eq!(format_check_line(&invalid), "invalid  S-1");
    }
}
