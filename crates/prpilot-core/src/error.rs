//! Error types for PR generation.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// One offending field in a raw input record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub reason: String,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Raised before any generation attempt. Always recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid input ({})", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn fields(&self) -> Vec<&'static str> {
        self.issues.iter().map(|i| i.field).collect()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }
}

/// Failure of the remote generation service. Every variant triggers the
/// local fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("generation service unreachable: {0}")]
    Unavailable(String),

    #[error("generation service timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    #[error("generation service rejected the request ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("generation service returned a malformed response: {0}")]
    Malformed(String),
}

/// An unsupported kind reached the generator. Fatal to the single request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationFailure {
    #[error("Unsupported PR type: {0}")]
    UnsupportedKind(String),

    #[error("input for {input} cannot be generated as {requested}")]
    KindMismatch {
        requested: crate::TargetSystemKind,
        input: crate::TargetSystemKind,
    },
}
