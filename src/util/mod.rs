//! Shared utilities for `jira_bulk_edit`.
//!
//! - Progress indicators (for long-running runs)
//! - Live-mode confirmation prompt

pub mod progress;

use std::io::{BufRead, Write};

/// Ask the operator to confirm a live run.
///
/// Only the exact answer `yes` (case-insensitive) confirms.
///
/// # Errors
///
/// Returns an error if the prompt cannot be written or the answer read.
pub fn confirm_live_run<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> std::io::Result<bool> {
    write!(
        output,
        "\nWARNING: You are about to update Jira issues in LIVE mode.\n\
         Are you sure you want to continue? (yes/no): "
    )?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}
