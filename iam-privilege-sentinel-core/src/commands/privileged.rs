//! Privileged-action detection for policy-change events

use super::{into_change, ChangeOutcome};
use crate::error::SentinelResult;
use crate::matching::{match_actions, PrivilegedActionList};
use crate::notify::{templates, NotificationSink};
use crate::parsing::{extract_actions, normalize, PolicyLookup};
use log::info;
use serde_json::Value;

/// Normalize the trigger, flatten the document and notify when any action is privileged.
///
/// A document without privileged actions produces no notification.
pub async fn detect_privileged_actions<L, N>(
    raw: &Value,
    privileged: &PrivilegedActionList,
    lookup: &L,
    sink: &N,
) -> SentinelResult<ChangeOutcome>
where
    L: PolicyLookup + ?Sized,
    N: NotificationSink + ?Sized,
{
    let event = match into_change(normalize(raw, lookup).await?) {
        Ok(event) => event,
        Err(outcome) => return Ok(outcome),
    };

    let actions = extract_actions(&event.policy_document)?;
    let matches = match_actions(&actions, privileged);
    if matches.is_empty() {
        info!(
            "No privileged actions among {} actions of {}",
            actions.len(),
            event.policy_reference
        );
        return Ok(ChangeOutcome::NothingToReport {
            policy_reference: event.policy_reference,
        });
    }

    let notification = templates::privileged_actions(&event, &matches);
    let receipt = sink.publish(&notification).await?;
    info!("Notification sent: {:?}", receipt);

    Ok(ChangeOutcome::Notified {
        policy_reference: event.policy_reference,
        reported: matches.len(),
        receipt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{NoLookup, RecordingSink};
    use crate::error::SentinelError;
    use serde_json::json;

    fn put_user_policy(document: &str) -> Value {
        json!({
            "detail-type": "AWS API Call via CloudTrail",
            "detail": {
                "eventName": "PutUserPolicy",
                "eventTime": "2024-03-01T10:15:00Z",
                "userIdentity": {"arn": "arn:aws:iam::123456789012:user/admin"},
                "requestParameters": {
                    "userName": "bob",
                    "policyName": "bob-inline",
                    "policyDocument": document
                },
                "responseElements": null
            }
        })
    }

    #[tokio::test]
    async fn test_no_match_sends_nothing() {
        let sink = RecordingSink::default();
        let privileged = PrivilegedActionList::parse("iam:CreateUser").unwrap();
        let raw = put_user_policy(r#"{"Statement":[{"Effect":"Allow","Action":"s3:GetObject"}]}"#);

        let outcome = detect_privileged_actions(&raw, &privileged, &NoLookup, &sink)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ChangeOutcome::NothingToReport {
                policy_reference: "bob-inline".into()
            }
        );
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn test_ignored_event_sends_nothing() {
        let sink = RecordingSink::default();
        let privileged = PrivilegedActionList::parse("*").unwrap();
        let raw = json!({"detail": {"eventName": "DetachUserPolicy"}});

        let outcome = detect_privileged_actions(&raw, &privileged, &NoLookup, &sink)
            .await
            .unwrap();

        assert!(matches!(outcome, ChangeOutcome::Ignored { .. }));
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failure_completes_without_notification() {
        let sink = RecordingSink::default();
        let privileged = PrivilegedActionList::parse("*").unwrap();
        let raw = json!({"detail": {
            "eventName": "AttachUserPolicy",
            "eventTime": "2024-03-01T10:15:00Z",
            "userIdentity": {"arn": "arn:aws:iam::123456789012:user/admin"},
            "requestParameters": {"userName": "bob", "policyArn": "arn:aws:iam::aws:policy/IAMFullAccess"}
        }});

        let outcome = detect_privileged_actions(&raw, &privileged, &NoLookup, &sink)
            .await
            .unwrap();

        assert!(matches!(outcome, ChangeOutcome::LookupFailed { .. }));
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_document_sends_nothing() {
        let sink = RecordingSink::default();
        let privileged = PrivilegedActionList::parse("*").unwrap();
        let raw = put_user_policy(r#"{"Statement":[{"Effect":"Allow","NotAction":"s3:*"}]}"#);

        let err = detect_privileged_actions(&raw, &privileged, &NoLookup, &sink)
            .await
            .unwrap_err();

        assert!(matches!(err, SentinelError::MalformedDocument(_)));
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn test_sink_failure_propagates() {
        let sink = RecordingSink::failing();
        let privileged = PrivilegedActionList::parse("iam:*").unwrap();
        let raw = put_user_policy(r#"{"Statement":[{"Effect":"Allow","Action":"iam:PassRole"}]}"#);

        let err = detect_privileged_actions(&raw, &privileged, &NoLookup, &sink)
            .await
            .unwrap_err();

        assert!(matches!(err, SentinelError::Aws(_)));
    }
}
