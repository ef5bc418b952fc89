//! Error types for IAM Privilege Sentinel operations

use crate::aws::AwsError;
use thiserror::Error;

/// Errors that fail an invocation.
///
/// Unsupported triggers, lookup failures and failed access-report jobs are
/// not errors; they are reported through the outcome types in
/// [`crate::commands`].
#[derive(Debug, Error)]
pub enum SentinelError {
    /// The triggering event is missing a field the pipeline needs.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// The policy document cannot be flattened into actions.
    #[error("Malformed policy document: {0}")]
    MalformedDocument(String),

    /// The privileged-action list is empty or unreadable.
    #[error("Invalid privileged action list: {0}")]
    InvalidPatternList(String),

    /// A call that is not allowed to fail softly (S3 list load, SNS publish).
    #[error(transparent)]
    Aws(#[from] AwsError),
}

impl SentinelError {
    pub fn malformed_event(msg: impl Into<String>) -> Self {
        Self::MalformedEvent(msg.into())
    }

    pub fn malformed_document(msg: impl Into<String>) -> Self {
        Self::MalformedDocument(msg.into())
    }

    pub fn invalid_pattern_list(msg: impl Into<String>) -> Self {
        Self::InvalidPatternList(msg.into())
    }
}

pub type SentinelResult<T> = Result<T, SentinelError>;
