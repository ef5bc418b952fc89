//! IAM Access Analyzer client wrapper

use crate::aws::{to_utc, AwsError, AwsResult};
use crate::checks::{
    AccessCheck, CheckVerdict, FindingSource, FindingSummary, PolicyAnalyzer, ValidationFinding,
};
use async_trait::async_trait;
use aws_sdk_accessanalyzer::primitives::DateTime;
use aws_sdk_accessanalyzer::types::{
    Access, AccessCheckPolicyType, CheckAccessNotGrantedResult, Locale, PolicyType, ReasonSummary,
};
use aws_sdk_accessanalyzer::Client as AccessAnalyzerClient;

pub struct AwsAccessAnalyzerClient {
    client: AccessAnalyzerClient,
}

impl AwsAccessAnalyzerClient {
    pub fn new(client: AccessAnalyzerClient) -> Self {
        Self { client }
    }
}

fn rfc3339(value: &DateTime) -> Option<String> {
    to_utc(value).map(|t| t.to_rfc3339())
}

fn describe_reason(reason: &ReasonSummary) -> String {
    let description = reason.description().unwrap_or("no description");
    match reason.statement_index() {
        Some(index) => format!("statement {index}: {description}"),
        None => description.to_string(),
    }
}

#[async_trait]
impl PolicyAnalyzer for AwsAccessAnalyzerClient {
    async fn validate_policy(&self, policy_document: &str) -> AwsResult<Vec<ValidationFinding>> {
        let mut findings = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let response = self
                .client
                .validate_policy()
                .policy_document(policy_document)
                .policy_type(PolicyType::IdentityPolicy)
                .locale(Locale::En)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| AwsError::AnalyzerError(format!("Failed to validate policy: {e:?}")))?;

            findings.extend(response.findings().iter().map(|finding| ValidationFinding {
                finding_type: finding.finding_type().as_str().to_string(),
                issue_code: finding.issue_code().to_string(),
                details: finding.finding_details().to_string(),
                learn_more_link: finding.learn_more_link().to_string(),
            }));

            match response.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }
        Ok(findings)
    }

    async fn check_access_not_granted(
        &self,
        policy_document: &str,
        action: &str,
    ) -> AwsResult<AccessCheck> {
        let response = self
            .client
            .check_access_not_granted()
            .policy_document(policy_document)
            .policy_type(AccessCheckPolicyType::IdentityPolicy)
            .access(Access::builder().actions(action).build())
            .send()
            .await
            .map_err(|e| {
                AwsError::AnalyzerError(format!(
                    "Failed to check access not granted for '{action}': {e:?}"
                ))
            })?;

        let verdict = match response.result() {
            Some(CheckAccessNotGrantedResult::Fail) => CheckVerdict::Fail,
            _ => CheckVerdict::Pass,
        };
        Ok(AccessCheck {
            verdict,
            reasons: response.reasons().iter().map(describe_reason).collect(),
        })
    }
}

#[async_trait]
impl FindingSource for AwsAccessAnalyzerClient {
    async fn get_finding(&self, analyzer_arn: &str, finding_id: &str) -> AwsResult<FindingSummary> {
        let response = self
            .client
            .get_finding_v2()
            .analyzer_arn(analyzer_arn)
            .id(finding_id)
            .send()
            .await
            .map_err(|e| {
                AwsError::AnalyzerError(format!("Failed to get finding '{finding_id}': {e:?}"))
            })?;

        Ok(FindingSummary {
            analyzer_arn: analyzer_arn.to_string(),
            id: response.id().to_string(),
            status: response.status().as_str().to_string(),
            created_at: rfc3339(response.created_at()),
            resource_type: Some(response.resource_type().as_str().to_string()),
            finding_type: response.finding_type().map(|t| t.as_str().to_string()),
            resource_owner_account: Some(response.resource_owner_account().to_string()),
            analyzed_at: rfc3339(response.analyzed_at()),
            updated_at: rfc3339(response.updated_at()),
            details: response
                .finding_details()
                .iter()
                .map(|detail| format!("{detail:?}"))
                .collect(),
        })
    }
}
