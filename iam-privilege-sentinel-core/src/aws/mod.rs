//! AWS SDK integration: thin wrappers that implement the collaborator traits
//! over IAM, S3, SNS and IAM Access Analyzer clients.

pub mod analyzer_client;
pub mod iam_client;
pub mod s3_client;
pub mod sns_client;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("IAM client error: {0}")]
    IamError(String),
    #[error("S3 client error: {0}")]
    S3Error(String),
    #[error("SNS client error: {0}")]
    SnsError(String),
    #[error("Access Analyzer client error: {0}")]
    AnalyzerError(String),
    #[error("Policy document error: {0}")]
    PolicyError(String),
}

pub type AwsResult<T> = Result<T, AwsError>;

/// Convert an SDK timestamp into a chrono UTC timestamp.
pub(crate) fn to_utc(
    value: &aws_sdk_iam::primitives::DateTime,
) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_to_utc_keeps_seconds_and_nanos() {
        let sdk_time = aws_sdk_iam::primitives::DateTime::from_secs_and_nanos(1_700_000_000, 250);
        let converted = to_utc(&sdk_time).unwrap();
        let expected = chrono::Utc.timestamp_opt(1_700_000_000, 250).unwrap();
        assert_eq!(converted, expected);
    }
}
