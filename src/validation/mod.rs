//! Validation helpers for `jira_bulk_edit`.
//!
//! Submission numbers are the literal prefix `S-` followed by five or six
//! ASCII digits, anchored at both ends. Surrounding whitespace is ignored.

use regex::Regex;
use std::sync::LazyLock;

/// Pattern as shown to operators in skip messages.
pub const PATTERN_DISPLAY: &str = r"^S-\d{5,6}$";

static SUBMISSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^S-[0-9]{5,6}$").expect("submission pattern is valid"));

/// Validates submission numbers read from the source field.
pub struct SubmissionNumber;

impl SubmissionNumber {
    /// Return true when the trimmed value is a submission number.
    ///
    /// Absent, empty and whitespace-only input is never valid.
    #[must_use]
    pub fn is_valid(value: Option<&str>) -> bool {
        Self::normalize(value.unwrap_or_default()).is_some()
    }

    /// Return the trimmed value if it is a submission number.
    #[must_use]
    pub fn normalize(value: &str) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() || !SUBMISSION_PATTERN.is_match(trimmed) {
            return None;
        }
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_five_and_six_digits() {
        assert!(SubmissionNumber::is_valid(Some("S-12345")));
        assert!(SubmissionNumber::is_valid(Some("S-123456")));
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert!(SubmissionNumber::is_valid(Some(" S-123456 ")));
        assert_eq!(
            SubmissionNumber::normalize("\tS-54321\n").as_deref(),
            Some("S-54321")
        );
    }

    #[test]
    fn test_rejects_wrong_shapes() {
        for value in [
            "S-1234",
            "S-1234567",
            "s-12345",
            "S12345",
            "S-12345a",
            "xS-12345",
            "S-12 345",
            "S-١٢٣٤٥",
        ] {
            assert!(!SubmissionNumber::is_valid(Some(value)), "{value}");
        }
    }

    #[test]
    fn test_rejects_absent_and_blank() {
        assert!(!SubmissionNumber::is_valid(None));
        assert!(!SubmissionNumber::is_valid(Some("")));
        assert!(!SubmissionNumber::is_valid(Some("   ")));
    }
}
