//! AWS IAM client wrapper for policy lookups and access-report jobs

use crate::analysis::AccessReportSource;
use crate::aws::{to_utc, AwsError, AwsResult};
use crate::parsing::PolicyLookup;
use crate::types::{JobStatus, ReportPage, ServiceLastAccessed, TrackedAction};
use async_trait::async_trait;
use aws_sdk_iam::types::{AccessAdvisorUsageGranularityType, JobStatusType};
use aws_sdk_iam::Client as IamClient;
use log::warn;
use serde_json::Value;

pub struct AwsIamClient {
    client: IamClient,
}

impl AwsIamClient {
    pub fn new(client: IamClient) -> Self {
        Self { client }
    }

    async fn default_version_id(&self, policy_arn: &str) -> AwsResult<String> {
        let response = self
            .client
            .get_policy()
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|e| {
                AwsError::IamError(format!("Failed to get policy '{policy_arn}': {e:?}"))
            })?;
        response
            .policy()
            .and_then(|policy| policy.default_version_id())
            .map(str::to_string)
            .ok_or_else(|| {
                AwsError::PolicyError(format!("Policy '{policy_arn}' has no default version"))
            })
    }
}

/// URL decode and parse a policy document (IAM returns URL-encoded JSON).
pub fn decode_policy_document(encoded: &str) -> AwsResult<Value> {
    let decoded = percent_encoding::percent_decode_str(encoded)
        .decode_utf8()
        .map_err(|e| AwsError::PolicyError(format!("Failed to URL decode policy document: {e}")))?;

    serde_json::from_str(&decoded)
        .map_err(|e| AwsError::PolicyError(format!("Failed to parse policy document JSON: {e}")))
}

#[async_trait]
impl PolicyLookup for AwsIamClient {
    async fn default_policy_document(&self, policy_arn: &str) -> AwsResult<Value> {
        let version_id = self.default_version_id(policy_arn).await?;
        let response = self
            .client
            .get_policy_version()
            .policy_arn(policy_arn)
            .version_id(&version_id)
            .send()
            .await
            .map_err(|e| {
                AwsError::IamError(format!(
                    "Failed to get version '{version_id}' of policy '{policy_arn}': {e:?}"
                ))
            })?;
        let document = response
            .policy_version()
            .and_then(|version| version.document())
            .ok_or_else(|| {
                AwsError::PolicyError(format!(
                    "Version '{version_id}' of policy '{policy_arn}' has no document"
                ))
            })?;
        decode_policy_document(document)
    }
}

#[async_trait]
impl AccessReportSource for AwsIamClient {
    async fn generate_report(&self, entity_arn: &str) -> AwsResult<String> {
        let response = self
            .client
            .generate_service_last_accessed_details()
            .arn(entity_arn)
            .granularity(AccessAdvisorUsageGranularityType::ActionLevel)
            .send()
            .await
            .map_err(|e| {
                AwsError::IamError(format!(
                    "Failed to generate access report for '{entity_arn}': {e:?}"
                ))
            })?;
        response
            .job_id()
            .map(str::to_string)
            .ok_or_else(|| AwsError::IamError("access report response has no JobId".to_string()))
    }

    async fn report_page(&self, job_id: &str, marker: Option<&str>) -> AwsResult<ReportPage> {
        let response = self
            .client
            .get_service_last_accessed_details()
            .job_id(job_id)
            .set_marker(marker.map(str::to_string))
            .send()
            .await
            .map_err(|e| {
                AwsError::IamError(format!("Failed to get access report '{job_id}': {e:?}"))
            })?;

        let status = match response.job_status() {
            JobStatusType::InProgress => JobStatus::InProgress,
            JobStatusType::Completed => JobStatus::Completed,
            JobStatusType::Failed => JobStatus::Failed,
            other => {
                warn!("Unknown job status {:?} for report {}", other, job_id);
                JobStatus::Failed
            }
        };

        Ok(ReportPage {
            status,
            services: response
                .services_last_accessed()
                .iter()
                .map(convert_service)
                .collect(),
            marker: response.marker().map(str::to_string),
            error: response.error().map(|e| e.message().to_string()),
        })
    }
}

fn convert_service(service: &aws_sdk_iam::types::ServiceLastAccessed) -> ServiceLastAccessed {
    ServiceLastAccessed {
        service_name: service.service_name().to_string(),
        service_namespace: service.service_namespace().to_string(),
        last_authenticated: service.last_authenticated().and_then(to_utc),
        total_authenticated_entities: service.total_authenticated_entities().unwrap_or(0),
        // The field itself distinguishes "no action history" from an empty list.
        tracked_actions: service.tracked_actions_last_accessed.as_ref().map(|actions| {
            actions
                .iter()
                .filter_map(|action| {
                    Some(TrackedAction {
                        action_name: action.action_name()?.to_string(),
                        last_accessed_time: action.last_accessed_time().and_then(to_utc),
                    })
                })
                .collect()
        }),
    }
}
