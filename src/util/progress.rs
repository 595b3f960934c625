//! Progress indicator for a running bulk edit.
//!
//! Drawn on stderr only when it is an interactive terminal, so piped output
//! and log files stay clean.

use crate::model::RunCounters;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{IsTerminal, stderr};
use std::time::Duration;

/// Check if we should show progress indicators.
#[must_use]
pub fn should_show_progress() -> bool {
    stderr().is_terminal()
}

/// Create a spinner for indeterminate operations.
///
/// # Panics
/// Panics if the spinner template string is invalid.
#[must_use]
pub fn create_spinner(message: &str, show: bool) -> ProgressBar {
    let pb = ProgressBar::new_spinner();

    if show {
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("valid template"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
    } else {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    pb
}

/// Spinner that mirrors the run counters.
pub struct RunProgress {
    bar: ProgressBar,
}

impl RunProgress {
    /// Create a spinner; hidden unless `show` is set and stderr is a terminal.
    #[must_use]
    pub fn new(show: bool) -> Self {
        Self {
            bar: create_spinner("Searching...", show && should_show_progress()),
        }
    }

    /// Record the store's latest estimate of matching issues.
    pub fn set_total(&self, total: Option<u64>) {
        if let Some(total) = total {
            self.bar.set_length(total);
        }
    }

    /// Advance after one issue.
    pub fn tick(&self, key: &str, counters: &RunCounters) {
        self.bar.inc(1);
        self.bar.set_message(format!("{} {key}", describe(counters)));
    }

    /// Stop the spinner and leave the final counters on screen.
    pub fn finish(&self, counters: &RunCounters) {
        self.bar.finish_with_message(describe(counters));
    }
}

fn describe(counters: &RunCounters) -> String {
    format!(
        "processed {} (updated {}, skipped {}, errors {})",
        counters.processed, counters.updated, counters.skipped, counters.errors
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_hidden_when_not_requested() {
        let spinner = create_spinner("Testing...", false);
        spinner.finish();
    }

    #[test]
    fn test_run_progress_hidden() {
        let progress = RunProgress::new(false);
        assert!(progress.bar.is_hidden());
        let counters = RunCounters {
            processed: 1,
            updated: 1,
            ..RunCounters::default()
        };
        progress.set_total(Some(3));
        progress.tick("ES-1", &counters);
        progress.finish(&counters);
    }

    #[test]
    fn test_describe_counters() {
        let counters = RunCounters {
            processed: 4,
            updated: 2,
            skipped: 1,
            errors: 1,
        };
        assert_eq!(
            describe(&counters),
            "processed 4 (updated 2, skipped 1, errors 1)"
        );
    }
}
