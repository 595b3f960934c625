//! Error types and handling for `jira_bulk_edit`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration for ad-hoc context
//! - Provides recovery hints for user-facing errors
//! - Separates run-fatal conditions (configuration, transport, malformed
//!   responses) from per-issue outcomes, which never surface as errors here
//! - Provides structured JSON output for scripted callers

mod structured;

pub use structured::{ErrorCode, StructuredError};

use thiserror::Error;

/// Primary error type for `jira_bulk_edit` operations.
#[derive(Error, Debug)]
pub enum BulkEditError {
    // === Configuration Errors ===
    /// Configuration value missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required credentials are not set.
    #[error("Missing required credentials: {}", missing.join(", "))]
    MissingCredentials { missing: Vec<String> },

    // === Transport Errors ===
    /// The store answered with a non-success status.
    #[error("{method} {endpoint} failed with status {status}: {body}")]
    Transport {
        method: String,
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The store could not be reached at all.
    #[error("HTTP transport error for {endpoint}: {reason}")]
    Http { endpoint: String, reason: String },

    /// The store answered, but the payload did not have the expected shape.
    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    // === Validation Errors ===
    /// Argument validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// The operator declined the live-mode confirmation.
    #[error("Operation cancelled by user")]
    Cancelled,

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BulkEditError {
    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::MissingCredentials { .. } => {
                Some("Set JIRA_URL, JIRA_EMAIL and JIRA_API_TOKEN in the environment or .env file")
            }
            Self::Transport { status: 401 | 403, .. } => {
                Some("Check JIRA_EMAIL and JIRA_API_TOKEN; the store rejected the credentials")
            }
            Self::Transport { status: 400, .. } => {
                Some("Check the JQL query and field identifiers")
            }
            Self::Transport { status: 429, .. } => Some("Rate limited; wait and re-run"),
            Self::Http { .. } => Some("Check JIRA_URL and network connectivity"),
            Self::Cancelled => Some("Re-run with --yes or answer 'yes' to apply changes"),
            _ => None,
        }
    }

    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed-response error for an endpoint.
    #[must_use]
    pub fn malformed(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}

/// Result type using `BulkEditError`.
pub type Result<T> = std::result::Result<T, BulkEditError>;
