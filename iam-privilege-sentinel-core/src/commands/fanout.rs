//! Republishing normalized policy changes for downstream evaluators

use super::{into_change, ChangeOutcome};
use crate::error::{SentinelError, SentinelResult};
use crate::notify::{Notification, NotificationSink};
use crate::parsing::{normalize_cloudtrail, PolicyLookup};
use log::info;
use serde_json::Value;

/// Normalize a CloudTrail event and publish it, as JSON, to the fan-out topic.
pub async fn fan_out_policy_change<L, N>(
    raw: &Value,
    lookup: &L,
    sink: &N,
) -> SentinelResult<ChangeOutcome>
where
    L: PolicyLookup + ?Sized,
    N: NotificationSink + ?Sized,
{
    let event = match into_change(normalize_cloudtrail(raw, lookup).await?) {
        Ok(event) => event,
        Err(outcome) => return Ok(outcome),
    };

    let message = serde_json::to_string(&event).map_err(|e| {
        SentinelError::malformed_document(format!("policy change is not serializable: {e}"))
    })?;
    let receipt = sink.publish(&Notification::without_subject(message)).await?;
    info!("Fan-out message sent: {:?}", receipt);

    Ok(ChangeOutcome::Forwarded {
        policy_reference: event.policy_reference,
        receipt,
    })
}
