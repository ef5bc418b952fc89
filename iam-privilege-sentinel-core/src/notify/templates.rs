//! Fixed-template report bodies
//!
//! Templates never fail: absent optional fields render as `None`.

use super::Notification;
use crate::checks::{FailedCheck, FindingSummary, ValidationFinding};
use crate::parsing::BuildReport;
use crate::types::{MatchResult, PolicyChangeEvent, UnusedAccessReport, NO_TARGET};
use serde::Serialize;
use std::fmt::Write;

pub const PRIVILEGED_SUBJECT: &str = "Policy Document contains privileged action(s)";
pub const UNUSED_SUBJECT: &str = "Policy Document contains unused permission(s)";
pub const VALIDATION_SUBJECT: &str = "Policy Document Check for Policy Validation";
pub const CUSTOM_CHECKS_SUBJECT: &str = "Policy Document Check for Custom Policy Checks";
pub const FINDING_SUBJECT: &str = "Unused findings";
pub const PIPELINE_SUBJECT: &str = "Pipeline Build Result";

fn or_none(value: Option<&str>) -> &str {
    value.unwrap_or(NO_TARGET)
}

fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unrenderable: {e}>"))
}

/// The context block shared by every policy-change report.
fn change_header(heading: &str, verb: &str, event: &PolicyChangeEvent) -> String {
    format!(
        "{heading} {reference} \n\n\
         Action triggering policy {verb}: {trigger} \n\n\
         Role performing action: {actor} \n\n\
         Event time: {time} \n\n\
         Target principal: {target} \n\n\
         Policy Document: {document} \n\n",
        reference = event.policy_reference,
        trigger = event.trigger,
        actor = event.actor_display(),
        time = event.event_time.to_rfc3339(),
        target = event.target_display(),
        document = pretty(&event.policy_document),
    )
}

pub fn privileged_actions(event: &PolicyChangeEvent, matches: &[MatchResult]) -> Notification {
    let mut body = change_header(
        "Privileged action(s) have been detected in identity-based policy",
        "linting",
        event,
    );
    body.push_str("Privileged actions found:");
    for result in matches {
        let _ = write!(
            body,
            "\n- {} (matched: {})",
            result.action,
            result.matched_patterns.join(", ")
        );
    }
    Notification::new(PRIVILEGED_SUBJECT, body)
}

pub fn policy_validation(event: &PolicyChangeEvent, findings: &[ValidationFinding]) -> Notification {
    let mut body = change_header("Critical permissions evaluation for IAM Policy", "evaluation", event);
    body.push_str("Evaluation:");
    for finding in findings {
        let _ = write!(
            body,
            "\n- [{}] {}: {} ({})",
            finding.finding_type, finding.issue_code, finding.details, finding.learn_more_link
        );
    }
    Notification::new(VALIDATION_SUBJECT, body)
}

pub fn custom_policy_checks(event: &PolicyChangeEvent, failed: &[FailedCheck]) -> Notification {
    let mut body = change_header("Custom policy checks for IAM Policy", "evaluation", event);
    body.push_str("Evaluation:");
    for check in failed {
        let _ = write!(body, "\n- {} is granted", check.action);
        for reason in &check.reasons {
            let _ = write!(body, "\n    {reason}");
        }
    }
    Notification::new(CUSTOM_CHECKS_SUBJECT, body)
}

pub fn unused_access(report: &UnusedAccessReport) -> Notification {
    Notification::new(
        UNUSED_SUBJECT,
        format!("Unused Permissions: {}", pretty(report)),
    )
}

pub fn unused_finding(finding: &FindingSummary) -> Notification {
    let details = if finding.details.is_empty() {
        NO_TARGET.to_string()
    } else {
        finding.details.join("; ")
    };
    let body = format!(
        "Analyzer {analyzer} \n\n\
         Finding id {id} \n\n\
         Status: {status} \n\n\
         Created at: {created} \n\n\
         Resource Type: {resource_type} \n\n\
         Finding Type: {finding_type} \n\n\
         Resource Owner Account: {owner} \n\n\
         Analysis Time: {analyzed} \n\n\
         Updated at: {updated} \n\n\
         Finding Details: {details} \n\n",
        analyzer = finding.analyzer_arn,
        id = finding.id,
        status = finding.status,
        created = or_none(finding.created_at.as_deref()),
        resource_type = or_none(finding.resource_type.as_deref()),
        finding_type = or_none(finding.finding_type.as_deref()),
        owner = or_none(finding.resource_owner_account.as_deref()),
        analyzed = or_none(finding.analyzed_at.as_deref()),
        updated = or_none(finding.updated_at.as_deref()),
    );
    Notification::new(FINDING_SUBJECT, body)
}

pub fn pipeline_build(report: &BuildReport) -> Notification {
    let body = format!(
        "Pipeline Build Result for build-id: {id}\n\n\
         Status: {status} \n\n\
         Project Name: {project} \n\n\
         Initiator: {initiator} \n\n\
         Build start time: {start} \n\n\
         URL for logs: {logs} \n\n\
         Context: {context}",
        id = report.build_id,
        status = report.status,
        project = report.project_name,
        initiator = or_none(report.initiator.as_deref()),
        start = or_none(report.build_start_time.as_deref()),
        logs = or_none(report.logs_link.as_deref()),
        context = serde_json::Value::from(report.failed_phase_contexts.clone()),
    );
    Notification::new(PIPELINE_SUBJECT, body)
}
