//! Structured error output for scripted callers.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for self-correction
//! - Retryability flags
//! - Context for debugging (endpoint, status, response body)

use crate::error::BulkEditError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Longest response body kept in structured context.
const MAX_BODY_CONTEXT: usize = 2_000;

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Config Errors (exit code 2) ===
    /// Configuration value missing or malformed
    ConfigError,
    /// Credentials not set
    MissingCredentials,
    /// Argument validation failed
    ValidationFailed,

    // === Transport Errors (exit code 3) ===
    /// Store answered with non-success status
    TransportError,
    /// Store unauthorized the request
    Unauthorized,
    /// Store unreachable
    ConnectionFailed,

    // === Response Errors (exit code 4) ===
    /// Store payload did not match the expected schema
    MalformedResponse,
    /// JSON serialization error
    JsonError,

    // === I/O Errors (exit code 5) ===
    /// File I/O error
    IoError,
    /// YAML parsing error
    YamlError,

    // === Cancelled (exit code 0) ===
    /// Operator declined confirmation
    Cancelled,

    // === Internal Errors (exit code 1) ===
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigError => "CONFIG_ERROR",
            Self::MissingCredentials => "MISSING_CREDENTIALS",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::TransportError => "TRANSPORT_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::ConnectionFailed => "CONNECTION_FAILED",
            Self::MalformedResponse => "MALFORMED_RESPONSE",
            Self::JsonError => "JSON_ERROR",
            Self::IoError => "IO_ERROR",
            Self::YamlError => "YAML_ERROR",
            Self::Cancelled => "CANCELLED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether re-running unchanged might succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportError | Self::ConnectionFailed)
    }

    /// Get the exit code for this error category.
    ///
    /// - 0: cancelled by the operator
    /// - 1: internal/unknown errors
    /// - 2: configuration errors
    /// - 3: transport errors
    /// - 4: response errors
    /// - 5: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Cancelled => 0,
            Self::ConfigError | Self::MissingCredentials | Self::ValidationFailed => 2,
            Self::TransportError | Self::Unauthorized | Self::ConnectionFailed => 3,
            Self::MalformedResponse | Self::JsonError => 4,
            Self::IoError | Self::YamlError => 5,
            Self::InternalError => 1,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `BulkEditError`.
    #[must_use]
    pub fn from_error(err: &BulkEditError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);

        Self {
            code,
            message: err.to_string(),
            hint: err.suggestion().map(str::to_string),
            retryable: code.is_retryable(),
            context,
        }
    }

    /// Serialize to JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &BulkEditError) -> (ErrorCode, Option<Value>) {
        match err {
            BulkEditError::Config(_) => (ErrorCode::ConfigError, None),
            BulkEditError::MissingCredentials { missing } => (
                ErrorCode::MissingCredentials,
                Some(json!({ "missing": missing })),
            ),
            BulkEditError::Validation { field, reason } => (
                ErrorCode::ValidationFailed,
                Some(json!({ "field": field, "reason": reason })),
            ),
            BulkEditError::Transport {
                method,
                endpoint,
                status,
                body,
            } => {
                let code = if matches!(status, 401 | 403) {
                    ErrorCode::Unauthorized
                } else {
                    ErrorCode::TransportError
                };
                (
                    code,
                    Some(json!({
                        "method": method,
                        "endpoint": endpoint,
                        "status": status,
                        "body": truncate_body(body),
                    })),
                )
            }
            BulkEditError::Http { endpoint, reason } => (
                ErrorCode::ConnectionFailed,
                Some(json!({ "endpoint": endpoint, "reason": reason })),
            ),
            BulkEditError::MalformedResponse { endpoint, reason } => (
                ErrorCode::MalformedResponse,
                Some(json!({ "endpoint": endpoint, "reason": reason })),
            ),
            BulkEditError::Cancelled => (ErrorCode::Cancelled, None),
            BulkEditError::Io(_) => (ErrorCode::IoError, None),
            BulkEditError::Json(_) => (ErrorCode::JsonError, None),
            BulkEditError::Yaml(_) => (ErrorCode::YamlError, None),
            BulkEditError::Other(_) => (ErrorCode::InternalError, None),
        }
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_BODY_CONTEXT {
        return body.to_string();
    }
    let mut end = MAX_BODY_CONTEXT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
