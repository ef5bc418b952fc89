//! IAM Access Analyzer evaluations of a changed policy
//!
//! - `ValidatePolicy` findings (grammar, security warnings, suggestions)
//! - `CheckAccessNotGranted` per privileged action
//! - unused-access findings raised by an analyzer

use crate::aws::AwsResult;
use crate::error::{SentinelError, SentinelResult};
use crate::matching::PrivilegedActionList;
use crate::types::PolicyChangeEvent;
use async_trait::async_trait;
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFinding {
    pub finding_type: String,
    pub issue_code: String,
    pub details: String,
    pub learn_more_link: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckVerdict {
    Pass,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessCheck {
    pub verdict: CheckVerdict,
    pub reasons: Vec<String>,
}

/// A privileged action the policy grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedCheck {
    pub action: String,
    pub reasons: Vec<String>,
}

/// The fields of an analyzer finding that go into the report.
/// Timestamps are RFC 3339 strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FindingSummary {
    pub analyzer_arn: String,
    pub id: String,
    pub status: String,
    pub created_at: Option<String>,
    pub resource_type: Option<String>,
    pub finding_type: Option<String>,
    pub resource_owner_account: Option<String>,
    pub analyzed_at: Option<String>,
    pub updated_at: Option<String>,
    pub details: Vec<String>,
}

/// Identifies the finding carried by an Access Analyzer EventBridge event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FindingReference {
    #[serde(rename = "resource")]
    pub analyzer_arn: String,
    #[serde(rename = "findingId")]
    pub finding_id: String,
}

#[async_trait]
pub trait PolicyAnalyzer: Send + Sync {
    /// Run `ValidatePolicy` on an identity policy.
    async fn validate_policy(&self, policy_document: &str) -> AwsResult<Vec<ValidationFinding>>;

    /// Run `CheckAccessNotGranted` for a single action.
    async fn check_access_not_granted(
        &self,
        policy_document: &str,
        action: &str,
    ) -> AwsResult<AccessCheck>;
}

#[async_trait]
pub trait FindingSource: Send + Sync {
    async fn get_finding(&self, analyzer_arn: &str, finding_id: &str) -> AwsResult<FindingSummary>;
}

fn document_text(event: &PolicyChangeEvent) -> String {
    event.policy_document.to_string()
}

/// Validate the changed document. Analyzer errors fail the invocation.
pub async fn validate<A>(event: &PolicyChangeEvent, analyzer: &A) -> SentinelResult<Vec<ValidationFinding>>
where
    A: PolicyAnalyzer + ?Sized,
{
    let findings = analyzer.validate_policy(&document_text(event)).await?;
    info!(
        "Validation of {} returned {} findings",
        event.policy_reference,
        findings.len()
    );
    Ok(findings)
}

/// Check each privileged-action entry against the document.
///
/// An action whose check errors is logged and skipped; the others are still
/// checked.
pub async fn run_custom_checks<A>(
    event: &PolicyChangeEvent,
    privileged: &PrivilegedActionList,
    analyzer: &A,
) -> Vec<FailedCheck>
where
    A: PolicyAnalyzer + ?Sized,
{
    let document = document_text(event);
    let mut failed = Vec::new();
    for action in privileged.patterns() {
        match analyzer.check_access_not_granted(&document, action).await {
            Ok(AccessCheck {
                verdict: CheckVerdict::Fail,
                reasons,
            }) => failed.push(FailedCheck {
                action: action.to_string(),
                reasons,
            }),
            Ok(_) => {}
            Err(e) => error!("CheckAccessNotGranted for {} failed: {:?}", action, e),
        }
    }
    info!(
        "{} of {} privileged actions are granted by {}",
        failed.len(),
        privileged.len(),
        event.policy_reference
    );
    failed
}

/// Read `detail.findingId` and `detail.resource` from an analyzer event.
pub fn parse_finding_event(raw: &Value) -> SentinelResult<FindingReference> {
    let detail = raw
        .get("detail")
        .ok_or_else(|| SentinelError::malformed_event("finding event has no detail"))?;
    FindingReference::deserialize(detail)
        .map_err(|e| SentinelError::malformed_event(format!("not an analyzer finding event: {e}")))
}
