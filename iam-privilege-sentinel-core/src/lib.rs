//! This crate provides the core business logic for IAM Privilege Sentinel:
//! - Normalization of IAM policy-change events (CloudTrail or SNS fan-out)
//! - Privileged-action matching against a wildcard list
//! - Unused-access analysis from service-last-accessed reports
//! - Access Analyzer validation, custom checks and finding reports
//! - SNS report rendering and delivery
//!

pub mod analysis;
pub mod aws;
pub mod checks;
pub mod commands;
mod error;
pub mod matching;
pub mod notify;
pub mod parsing;
mod types;

// Re-exports for a small, focused public API
pub use aws::{AwsError, AwsResult};
pub use commands::{ChangeOutcome, SentinelService};
pub use error::{SentinelError, SentinelResult};
pub use types::{
    DocumentSource, ExpiredService, JobStatus, MatchResult, PolicyChangeEvent, PolicyMutation,
    ReportPage, ServiceLastAccessed, TrackedAction, UnusedAccessReport, NO_TARGET,
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_user_policy_flows_into_matches() {
        struct NoLookup;

        #[async_trait::async_trait]
        impl parsing::PolicyLookup for NoLookup {
            async fn default_policy_document(&self, arn: &str) -> AwsResult<serde_json::Value> {
                Err(AwsError::IamError(arn.to_string()))
            }
        }

        let raw = json!({"detail": {
            "eventName": "PutUserPolicy",
            "eventTime": "2024-03-01T10:15:00Z",
            "userIdentity": {"arn": "arn:aws:iam::123456789012:user/admin"},
            "requestParameters": {
                "userName": "bob",
                "policyName": "p",
                "policyDocument": "{\"Statement\":[{\"Action\":[\"iam:CreateUser\",\"s3:GetObject\"]}]}"
            }
        }});

        let parsing::Normalized::Change(event) = parsing::normalize(&raw, &NoLookup).await.unwrap()
        else {
            panic!("expected a policy change");
        };
        let actions = parsing::extract_actions(&event.policy_document).unwrap();
        let list = matching::PrivilegedActionList::parse("iam:*\nec2:TerminateInstances").unwrap();
        let matches = matching::match_actions(&actions, &list);

        assert_eq!(
            matches,
            vec![MatchResult {
                action: "iam:CreateUser".into(),
                matched_patterns: vec!["iam:*".into()],
            }]
        );
    }
}
