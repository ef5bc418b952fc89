//! Normalization of policy-change triggers into [`PolicyChangeEvent`]s
//!
//! Two payload shapes are accepted: a CloudTrail API-call event delivered by
//! EventBridge, and an SNS envelope carrying a previously normalized event
//! (the fan-out format).

use crate::aws::AwsResult;
use crate::error::{SentinelError, SentinelResult};
use crate::parsing::envelope::{decode_sns_message, is_sns_envelope};
use crate::types::{DocumentSource, PolicyChangeEvent, PolicyMutation};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request parameters naming the principal a policy is attached to.
/// When several are present the user wins over the group, the group over the role.
const TARGET_FIELDS: [&str; 3] = ["userName", "groupName", "roleName"];

/// Resolves managed policy documents for attach/set-default events.
#[async_trait]
pub trait PolicyLookup: Send + Sync {
    /// Fetch the document of the policy's current default version.
    async fn default_policy_document(&self, policy_arn: &str) -> AwsResult<Value>;
}

/// Result of normalizing one trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Normalized {
    Change(PolicyChangeEvent),
    /// The event is not one of the supported IAM mutations.
    Ignored { event_name: String },
    /// The managed policy document could not be fetched.
    LookupFailed { policy_arn: String, reason: String },
}

#[derive(Debug, Deserialize)]
struct CloudTrailEvent {
    detail: ApiCallDetail,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCallDetail {
    event_name: String,
    #[serde(default)]
    event_time: Option<DateTime<Utc>>,
    #[serde(default)]
    user_identity: Option<UserIdentity>,
    #[serde(default)]
    request_parameters: Option<Map<String, Value>>,
    #[serde(default)]
    response_elements: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct UserIdentity {
    #[serde(default)]
    arn: Option<String>,
}

/// Normalize either payload shape.
pub async fn normalize<L>(raw: &Value, lookup: &L) -> SentinelResult<Normalized>
where
    L: PolicyLookup + ?Sized,
{
    if is_sns_envelope(raw) {
        normalize_envelope(raw).map(Normalized::Change)
    } else {
        normalize_cloudtrail(raw, lookup).await
    }
}

/// Decode a fan-out message back into the event it was built from.
pub fn normalize_envelope(raw: &Value) -> SentinelResult<PolicyChangeEvent> {
    let event: PolicyChangeEvent = decode_sns_message(raw)?;
    info!(
        "Received {} for policy {} from fan-out",
        event.trigger, event.policy_reference
    );
    Ok(event)
}

/// Normalize a CloudTrail API-call event.
///
/// Unsupported event names are ignored. Managed policies are resolved
/// through `lookup`; a failed lookup is logged and reported rather than
/// raised.
pub async fn normalize_cloudtrail<L>(raw: &Value, lookup: &L) -> SentinelResult<Normalized>
where
    L: PolicyLookup + ?Sized,
{
    let event = CloudTrailEvent::deserialize(raw)
        .map_err(|e| SentinelError::malformed_event(format!("not a CloudTrail event: {e}")))?;
    let detail = event.detail;

    let Some(trigger) = PolicyMutation::from_event_name(&detail.event_name) else {
        info!("API call not supported: {}", detail.event_name);
        return Ok(Normalized::Ignored {
            event_name: detail.event_name,
        });
    };
    info!("API call supported: {}", trigger);

    let params = detail.request_parameters.ok_or_else(|| {
        SentinelError::malformed_event(format!("{trigger} event has no requestParameters"))
    })?;
    debug!("requestParameters: {:?}", params);
    debug!("responseElements: {:?}", detail.response_elements);

    let actor_arn = detail.user_identity.and_then(|identity| identity.arn);
    if actor_arn.is_none() {
        warn!("{} event has no userIdentity.arn", trigger);
    }
    let event_time = detail
        .event_time
        .ok_or_else(|| SentinelError::malformed_event("event has no eventTime"))?;

    let (policy_reference, policy_document) = match trigger.document_source() {
        DocumentSource::Lookup => {
            let policy_arn = string_param(&params, "policyArn")?;
            match lookup.default_policy_document(&policy_arn).await {
                Ok(document) => (policy_arn, document),
                Err(e) => {
                    error!(
                        "Failed to resolve default version of policy {}: {:?}",
                        policy_arn, e
                    );
                    return Ok(Normalized::LookupFailed {
                        policy_arn,
                        reason: e.to_string(),
                    });
                }
            }
        }
        DocumentSource::Embedded { reference_field } => {
            let reference = string_param(&params, reference_field)?;
            (reference, embedded_document(&params)?)
        }
    };

    let target_principal = resolve_target(&params);
    if let Some(target) = &target_principal {
        info!("Found target {}", target);
    }
    info!("Found policy {}", policy_reference);

    Ok(Normalized::Change(PolicyChangeEvent {
        policy_reference,
        trigger,
        actor_arn,
        event_time,
        target_principal,
        policy_document,
    }))
}

fn string_param(params: &Map<String, Value>, name: &str) -> SentinelResult<String> {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| SentinelError::malformed_event(format!("requestParameters.{name} missing")))
}

/// CloudTrail records the document as a JSON string; tolerate an already decoded object.
fn embedded_document(params: &Map<String, Value>) -> SentinelResult<Value> {
    match params.get("policyDocument") {
        Some(Value::String(text)) => serde_json::from_str(text).map_err(|e| {
            SentinelError::malformed_document(format!("policyDocument is not valid JSON: {e}"))
        }),
        Some(document @ Value::Object(_)) => Ok(document.clone()),
        _ => Err(SentinelError::malformed_document(
            "requestParameters.policyDocument missing",
        )),
    }
}

fn resolve_target(params: &Map<String, Value>) -> Option<String> {
    TARGET_FIELDS
        .iter()
        .find_map(|field| params.get(*field).and_then(Value::as_str))
        .map(str::to_string)
}
