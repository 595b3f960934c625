//! Check command implementation.
//!
//! Runs the validator over literal values; never touches the network.

use crate::cli::CheckArgs;
use crate::error::Result;
use crate::format::{CheckLine, format_check_line};
use crate::validation::{PATTERN_DISPLAY, SubmissionNumber};
use serde::Serialize;

#[derive(Serialize)]
struct CheckOutput<'a> {
    pattern: &'a str,
    valid: usize,
    invalid: usize,
    values: &'a [CheckLine],
}

/// Validate each value and report the verdicts.
#[must_use]
pub fn check_values(values: &[String]) -> Vec<CheckLine> {
    values
        .iter()
        .map(|value| {
            let normalized = SubmissionNumber::normalize(value);
            CheckLine {
                value: value.clone(),
                valid: normalized.is_some(),
                normalized,
            }
        })
        .collect()
}

/// Execute the check command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(args: &CheckArgs, json: bool) -> Result<()> {
    let lines = check_values(&args.values);
    let valid = lines.iter().filter(|line| line.valid).count();

    if json {
        let output = CheckOutput {
            pattern: PATTERN_DISPLAY,
            valid,
            invalid: lines.len() - valid,
            values: &lines,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for line in &lines {
        println!("{}", format_check_line(line));
    }
    println!("{valid}/{} match {PATTERN_DISPLAY}", lines.len());
    Ok(())
}
