//! Shared domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Rendered in place of a target principal when the event names none.
pub const NO_TARGET: &str = "None";

/// The IAM mutation API calls that can change an identity-based policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyMutation {
    AttachGroupPolicy,
    AttachRolePolicy,
    AttachUserPolicy,
    CreatePolicy,
    CreatePolicyVersion,
    PutGroupPolicy,
    PutRolePolicy,
    PutUserPolicy,
    SetDefaultPolicyVersion,
}

/// Where the affected policy document comes from for a given mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSource {
    /// Managed policy referenced by `policyArn`; its default version must be fetched.
    Lookup,
    /// Document is embedded as a JSON string in `requestParameters.policyDocument`.
    /// The policy is referenced by the named request parameter.
    Embedded { reference_field: &'static str },
}

impl PolicyMutation {
    pub const ALL: [PolicyMutation; 9] = [
        PolicyMutation::AttachGroupPolicy,
        PolicyMutation::AttachRolePolicy,
        PolicyMutation::AttachUserPolicy,
        PolicyMutation::CreatePolicy,
        PolicyMutation::CreatePolicyVersion,
        PolicyMutation::PutGroupPolicy,
        PolicyMutation::PutRolePolicy,
        PolicyMutation::PutUserPolicy,
        PolicyMutation::SetDefaultPolicyVersion,
    ];

    /// Recognize a CloudTrail `eventName`. Anything else is not ours to handle.
    pub fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyMutation::AttachGroupPolicy => "AttachGroupPolicy",
            PolicyMutation::AttachRolePolicy => "AttachRolePolicy",
            PolicyMutation::AttachUserPolicy => "AttachUserPolicy",
            PolicyMutation::CreatePolicy => "CreatePolicy",
            PolicyMutation::CreatePolicyVersion => "CreatePolicyVersion",
            PolicyMutation::PutGroupPolicy => "PutGroupPolicy",
            PolicyMutation::PutRolePolicy => "PutRolePolicy",
            PolicyMutation::PutUserPolicy => "PutUserPolicy",
            PolicyMutation::SetDefaultPolicyVersion => "SetDefaultPolicyVersion",
        }
    }

    pub fn document_source(&self) -> DocumentSource {
        match self {
            PolicyMutation::AttachGroupPolicy
            | PolicyMutation::AttachRolePolicy
            | PolicyMutation::AttachUserPolicy
            | PolicyMutation::SetDefaultPolicyVersion => DocumentSource::Lookup,
            PolicyMutation::CreatePolicy
            | PolicyMutation::PutGroupPolicy
            | PolicyMutation::PutRolePolicy
            | PolicyMutation::PutUserPolicy => DocumentSource::Embedded {
                reference_field: "policyName",
            },
            PolicyMutation::CreatePolicyVersion => DocumentSource::Embedded {
                reference_field: "policyArn",
            },
        }
    }
}

impl fmt::Display for PolicyMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical record of one identity-based policy change.
///
/// The serialized form is the message published by the fan-out handler and
/// consumed again from SNS envelopes, so the field names are part of the
/// wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyChangeEvent {
    pub policy_reference: String,
    pub trigger: PolicyMutation,
    /// `None` when CloudTrail records no caller ARN (e.g. AWS service principals).
    #[serde(rename = "agent_role_arn", default)]
    pub actor_arn: Option<String>,
    pub event_time: DateTime<Utc>,
    #[serde(default)]
    pub target_principal: Option<String>,
    pub policy_document: Value,
}

impl PolicyChangeEvent {
    pub fn target_display(&self) -> &str {
        self.target_principal.as_deref().unwrap_or(NO_TARGET)
    }

    pub fn actor_display(&self) -> &str {
        self.actor_arn.as_deref().unwrap_or(NO_TARGET)
    }
}

/// One privileged action found in a policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub action: String,
    pub matched_patterns: Vec<String>,
}

/// Per-service access history for one principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceLastAccessed {
    pub service_name: String,
    pub service_namespace: String,
    pub last_authenticated: Option<DateTime<Utc>>,
    pub total_authenticated_entities: i32,
    /// `None` when the service has no action-level history at all.
    pub tracked_actions: Option<Vec<TrackedAction>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedAction {
    pub action_name: String,
    pub last_accessed_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    InProgress,
    Completed,
    Failed,
}

/// One page of a service-last-accessed report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPage {
    pub status: JobStatus,
    pub services: Vec<ServiceLastAccessed>,
    pub marker: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExpiredService {
    pub service_name: String,
    pub service_namespace: String,
    /// Only set for services with action-level tracking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UnusedAccessReport {
    #[serde(rename = "EntityARN")]
    pub entity_arn: String,
    pub entity_name: String,
    pub total_services: usize,
    pub expired_services: usize,
    pub expired_service_list: Vec<ExpiredService>,
}
