//! Access Analyzer pipelines fed by the fan-out topic and by analyzer findings

use super::ChangeOutcome;
use crate::checks::{parse_finding_event, run_custom_checks, validate, FindingSource, PolicyAnalyzer};
use crate::error::SentinelResult;
use crate::matching::PrivilegedActionList;
use crate::notify::{templates, NotificationSink, PublishReceipt};
use crate::parsing::normalize_envelope;
use log::info;
use serde_json::Value;

/// Validate the document carried by a fan-out envelope and report any findings.
pub async fn validate_policy_change<A, N>(
    envelope: &Value,
    analyzer: &A,
    sink: &N,
) -> SentinelResult<ChangeOutcome>
where
    A: PolicyAnalyzer + ?Sized,
    N: NotificationSink + ?Sized,
{
    let event = normalize_envelope(envelope)?;
    let findings = validate(&event, analyzer).await?;
    if findings.is_empty() {
        return Ok(ChangeOutcome::NothingToReport {
            policy_reference: event.policy_reference,
        });
    }

    let receipt = sink
        .publish(&templates::policy_validation(&event, &findings))
        .await?;
    info!("Validation report sent: {:?}", receipt);
    Ok(ChangeOutcome::Notified {
        policy_reference: event.policy_reference,
        reported: findings.len(),
        receipt,
    })
}

/// Report every privileged action the fan-out document is found to grant.
pub async fn check_privileged_access<A, N>(
    envelope: &Value,
    privileged: &PrivilegedActionList,
    analyzer: &A,
    sink: &N,
) -> SentinelResult<ChangeOutcome>
where
    A: PolicyAnalyzer + ?Sized,
    N: NotificationSink + ?Sized,
{
    let event = normalize_envelope(envelope)?;
    let failed = run_custom_checks(&event, privileged, analyzer).await;
    if failed.is_empty() {
        return Ok(ChangeOutcome::NothingToReport {
            policy_reference: event.policy_reference,
        });
    }

    let receipt = sink
        .publish(&templates::custom_policy_checks(&event, &failed))
        .await?;
    info!("Custom checks report sent: {:?}", receipt);
    Ok(ChangeOutcome::Notified {
        policy_reference: event.policy_reference,
        reported: failed.len(),
        receipt,
    })
}

/// Fetch the finding named by an analyzer event and forward its summary.
pub async fn report_unused_finding<F, N>(
    raw: &Value,
    findings: &F,
    sink: &N,
) -> SentinelResult<PublishReceipt>
where
    F: FindingSource + ?Sized,
    N: NotificationSink + ?Sized,
{
    let reference = parse_finding_event(raw)?;
    let finding = findings
        .get_finding(&reference.analyzer_arn, &reference.finding_id)
        .await?;
    let receipt = sink.publish(&templates::unused_finding(&finding)).await?;
    info!("Finding {} reported: {:?}", reference.finding_id, receipt);
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::{AwsError, AwsResult};
    use crate::checks::{AccessCheck, CheckVerdict, FindingSummary, ValidationFinding};
    use crate::commands::test_support::RecordingSink;
    use crate::error::SentinelError;
    use crate::notify::templates::{CUSTOM_CHECKS_SUBJECT, FINDING_SUBJECT, VALIDATION_SUBJECT};
    use async_trait::async_trait;
    use serde_json::json;

    struct GrantsIam {
        findings: Vec<ValidationFinding>,
    }

    #[async_trait]
    impl PolicyAnalyzer for GrantsIam {
        async fn validate_policy(&self, _policy_document: &str) -> AwsResult<Vec<ValidationFinding>> {
            Ok(self.findings.clone())
        }

        async fn check_access_not_granted(
            &self,
            _policy_document: &str,
            action: &str,
        ) -> AwsResult<AccessCheck> {
            let verdict = if action.starts_with("iam:") {
                CheckVerdict::Fail
            } else {
                CheckVerdict::Pass
            };
            Ok(AccessCheck {
                verdict,
                reasons: vec![],
            })
        }
    }

    struct Findings(Option<FindingSummary>);

    #[async_trait]
    impl FindingSource for Findings {
        async fn get_finding(&self, analyzer_arn: &str, finding_id: &str) -> AwsResult<FindingSummary> {
            self.0
                .clone()
                .filter(|f| f.analyzer_arn == analyzer_arn && f.id == finding_id)
                .ok_or_else(|| AwsError::AnalyzerError("ResourceNotFoundException".into()))
        }
    }

    fn fanout_envelope() -> Value {
        let message = json!({
            "trigger": "PutRolePolicy",
            "agent_role_arn": "arn:aws:iam::123456789012:user/alice",
            "target_principal": "app",
            "event_time": "2024-03-01T10:15:00Z",
            "policy_reference": "app-inline",
            "policy_document": {"Statement": [{"Effect": "Allow", "Action": "iam:*", "Resource": "*"}]}
        });
        json!({"Records": [{"Sns": {"Message": message.to_string()}}]})
    }

    fn finding_event() -> Value {
        json!({"detail": {
            "findingId": "f-9",
            "resource": "arn:aws:access-analyzer:eu-west-1:123456789012:analyzer/unused"
        }})
    }

    #[tokio::test]
    async fn test_validation_without_findings_is_silent() {
        let sink = RecordingSink::default();
        let outcome = validate_policy_change(&fanout_envelope(), &GrantsIam { findings: vec![] }, &sink)
            .await
            .unwrap();
        assert!(matches!(outcome, ChangeOutcome::NothingToReport { .. }));
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn test_validation_findings_are_reported() {
        let sink = RecordingSink::default();
        let analyzer = GrantsIam {
            findings: vec![ValidationFinding {
                finding_type: "SECURITY_WARNING".into(),
                issue_code: "PASS_ROLE_WITH_STAR_IN_RESOURCE".into(),
                details: "iam:PassRole with a wildcard resource".into(),
                learn_more_link: "https://docs.aws.amazon.com/IAM/latest/UserGuide/".into(),
            }],
        };

        let outcome = validate_policy_change(&fanout_envelope(), &analyzer, &sink)
            .await
            .unwrap();

        assert!(matches!(outcome, ChangeOutcome::Notified { reported: 1, .. }));
        let sent = sink.sent();
        assert_eq!(sent[0].subject.as_deref(), Some(VALIDATION_SUBJECT));
        assert!(sent[0].body.contains("PASS_ROLE_WITH_STAR_IN_RESOURCE"));
    }

    #[tokio::test]
    async fn test_custom_checks_report_granted_actions() {
        let sink = RecordingSink::default();
        let privileged =
            PrivilegedActionList::from_patterns(["iam:CreateUser", "s3:DeleteBucket", "iam:PassRole"])
                .unwrap();

        let outcome = check_privileged_access(
            &fanout_envelope(),
            &privileged,
            &GrantsIam { findings: vec![] },
            &sink,
        )
        .await
        .unwrap();

        assert!(matches!(outcome, ChangeOutcome::Notified { reported: 2, .. }));
        let sent = sink.sent();
        assert_eq!(sent[0].subject.as_deref(), Some(CUSTOM_CHECKS_SUBJECT));
        assert!(sent[0].body.contains("- iam:CreateUser is granted"));
        assert!(!sent[0].body.contains("s3:DeleteBucket"));
    }

    #[tokio::test]
    async fn test_non_envelope_input_is_malformed() {
        let sink = RecordingSink::default();
        let err = validate_policy_change(&json!({"detail": {}}), &GrantsIam { findings: vec![] }, &sink)
            .await
            .unwrap_err();
        assert!(matches!(err, SentinelError::MalformedEvent(_)));
    }

    #[tokio::test]
    async fn test_finding_is_reported() {
        let sink = RecordingSink::default();
        let source = Findings(Some(FindingSummary {
            analyzer_arn: "arn:aws:access-analyzer:eu-west-1:123456789012:analyzer/unused".into(),
            id: "f-9".into(),
            status: "ACTIVE".into(),
            finding_type: Some("UnusedPermission".into()),
            ..FindingSummary::default()
        }));

        let receipt = report_unused_finding(&finding_event(), &source, &sink)
            .await
            .unwrap();

        assert_eq!(receipt.message_id.as_deref(), Some("msg-1"));
        let sent = sink.sent();
        assert_eq!(sent[0].subject.as_deref(), Some(FINDING_SUBJECT));
        assert!(sent[0].body.contains("Finding Type: UnusedPermission"));
    }

    #[tokio::test]
    async fn test_finding_fetch_failure_propagates() {
        let sink = RecordingSink::default();
        let err = report_unused_finding(&finding_event(), &Findings(None), &sink)
            .await
            .unwrap_err();
        assert!(matches!(err, SentinelError::Aws(AwsError::AnalyzerError(_))));
        assert!(sink.sent().is_empty());
    }
}
