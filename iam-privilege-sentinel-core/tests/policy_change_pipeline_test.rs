//! End-to-end tests of the policy-change handlers with in-memory AWS collaborators.
//!
//! A CloudTrail event is fanned out, and the published message is fed to the
//! downstream handlers exactly as SNS would deliver it.

use async_trait::async_trait;
use iam_privilege_sentinel_core::commands::{
    detect_privileged_actions, fan_out_policy_change, ChangeOutcome,
};
use iam_privilege_sentinel_core::matching::{load_privileged_actions, PatternSource};
use iam_privilege_sentinel_core::notify::templates::PRIVILEGED_SUBJECT;
use iam_privilege_sentinel_core::notify::{Notification, NotificationSink, PublishReceipt};
use iam_privilege_sentinel_core::parsing::PolicyLookup;
use iam_privilege_sentinel_core::{AwsError, AwsResult, SentinelError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Topic {
    messages: Mutex<Vec<Notification>>,
}

impl Topic {
    fn messages(&self) -> Vec<Notification> {
        self.messages.lock().expect("topic lock").clone()
    }
}

#[async_trait]
impl NotificationSink for Topic {
    async fn publish(&self, notification: &Notification) -> AwsResult<PublishReceipt> {
        let mut messages = self.messages.lock().expect("topic lock");
        messages.push(notification.clone());
        Ok(PublishReceipt {
            message_id: Some(format!("{}", messages.len())),
        })
    }
}

struct Bucket(&'static str);

#[async_trait]
impl PatternSource for Bucket {
    async fn fetch_patterns(&self) -> AwsResult<String> {
        Ok(self.0.to_string())
    }
}

struct ManagedPolicies(HashMap<&'static str, Value>);

#[async_trait]
impl PolicyLookup for ManagedPolicies {
    async fn default_policy_document(&self, policy_arn: &str) -> AwsResult<Value> {
        self.0
            .get(policy_arn)
            .cloned()
            .ok_or_else(|| AwsError::IamError(format!("NoSuchEntity: {policy_arn}")))
    }
}

fn managed_policies() -> ManagedPolicies {
    ManagedPolicies(HashMap::from([(
        "arn:aws:iam::123456789012:policy/ops",
        json!({"Version": "2012-10-17", "Statement": [
            {"Effect": "Allow", "Action": ["ec2:Describe*", "ec2:TerminateInstances"], "Resource": "*"},
            {"Effect": "Allow", "Action": "s3:GetObject", "Resource": "*"}
        ]}),
    )]))
}

fn cloudtrail(event_name: &str, request_parameters: Value) -> Value {
    json!({
        "version": "0",
        "detail-type": "AWS API Call via CloudTrail",
        "source": "aws.iam",
        "detail": {
            "eventName": event_name,
            "eventTime": "2024-03-01T10:15:00Z",
            "userIdentity": {"arn": "arn:aws:sts::123456789012:assumed-role/deployer/session"},
            "requestParameters": request_parameters,
            "responseElements": null
        }
    })
}

fn delivered(notification: &Notification) -> Value {
    json!({"Records": [{"EventSource": "aws:sns", "Sns": {"Message": notification.body}}]})
}

const LIST: &str = "iam:*\n\nec2:TerminateInstances\n  s3:PutBucketPolicy  \n";

#[tokio::test]
async fn test_put_user_policy_reports_privileged_actions() {
    let topic = Topic::default();
    let list = load_privileged_actions(&Bucket(LIST)).await.unwrap();
    let raw = cloudtrail(
        "PutUserPolicy",
        json!({
            "userName": "bob",
            "policyName": "bob-admin",
            "policyDocument": "{\"Version\":\"2012-10-17\",\"Statement\":[{\"Effect\":\"Allow\",\"Action\":[\"iam:CreateUser\",\"s3:GetObject\"],\"Resource\":\"*\"}]}"
        }),
    );

    let outcome = detect_privileged_actions(&raw, &list, &managed_policies(), &topic)
        .await
        .unwrap();

    assert!(matches!(outcome, ChangeOutcome::Notified { reported: 1, .. }));
    let messages = topic.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].subject.as_deref(), Some(PRIVILEGED_SUBJECT));
    assert!(messages[0].body.contains("Target principal: bob"));
    assert!(messages[0].body.contains("- iam:CreateUser (matched: iam:*)"));
    assert!(!messages[0].body.contains("- s3:GetObject"));
}

#[tokio::test]
async fn test_fanned_out_managed_policy_is_evaluated_downstream() {
    let fanout = Topic::default();
    let notifications = Topic::default();
    let policies = managed_policies();
    let list = load_privileged_actions(&Bucket(LIST)).await.unwrap();
    let raw = cloudtrail(
        "AttachRolePolicy",
        json!({"roleName": "ops", "policyArn": "arn:aws:iam::123456789012:policy/ops"}),
    );

    fan_out_policy_change(&raw, &policies, &fanout).await.unwrap();
    let published = fanout.messages();
    assert_eq!(published.len(), 1);

    let outcome = detect_privileged_actions(&delivered(&published[0]), &list, &policies, &notifications)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ChangeOutcome::Notified {
            policy_reference: "arn:aws:iam::123456789012:policy/ops".into(),
            reported: 1,
            receipt: PublishReceipt {
                message_id: Some("1".into())
            },
        }
    );
    assert!(notifications.messages()[0]
        .body
        .contains("- ec2:TerminateInstances (matched: ec2:TerminateInstances)"));
}

#[tokio::test]
async fn test_missing_managed_policy_completes_quietly() {
    let topic = Topic::default();
    let list = load_privileged_actions(&Bucket(LIST)).await.unwrap();
    let raw = cloudtrail(
        "SetDefaultPolicyVersion",
        json!({"policyArn": "arn:aws:iam::123456789012:policy/gone", "versionId": "v3"}),
    );

    let outcome = detect_privileged_actions(&raw, &list, &managed_policies(), &topic)
        .await
        .unwrap();

    assert!(matches!(outcome, ChangeOutcome::LookupFailed { ref policy_arn, .. }
        if policy_arn == "arn:aws:iam::123456789012:policy/gone"));
    assert!(topic.messages().is_empty());
}

#[tokio::test]
async fn test_blank_list_is_rejected() {
    let err = load_privileged_actions(&Bucket(" \n\n")).await.unwrap_err();
    assert!(matches!(err, SentinelError::InvalidPatternList(_)));
}
