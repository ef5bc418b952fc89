//! Classification of service-last-accessed data into expired permissions

use crate::types::{ExpiredService, ServiceLastAccessed, UnusedAccessReport};
use chrono::{DateTime, Utc};

/// Services whose reports carry per-action history.
pub const ACTION_LEVEL_SERVICES: [&str; 4] = ["s3", "ec2", "iam", "lambda"];

/// Placeholder action for an action-level service with no action history.
pub const ALL_ACTIONS: &str = "All Actions";

/// Whole hours elapsed, truncated, so a window of 24 only expires at 25 hours.
fn is_expired(last_access: Option<DateTime<Utc>>, now: DateTime<Utc>, window_hours: u32) -> bool {
    match last_access {
        None => true,
        Some(at) => (now - at).num_hours() > i64::from(window_hours),
    }
}

/// Decide whether a service (or some of its actions) went unused.
pub fn classify_service(
    service: &ServiceLastAccessed,
    now: DateTime<Utc>,
    window_hours: u32,
) -> Option<ExpiredService> {
    let never_used = service.total_authenticated_entities == 0;

    if !ACTION_LEVEL_SERVICES.contains(&service.service_namespace.as_str()) {
        let expired = never_used || is_expired(service.last_authenticated, now, window_hours);
        return expired.then(|| ExpiredService {
            service_name: service.service_name.clone(),
            service_namespace: service.service_namespace.clone(),
            actions: None,
        });
    }

    let actions: Vec<String> = match &service.tracked_actions {
        None => vec![ALL_ACTIONS.to_string()],
        Some(tracked) if never_used => {
            if tracked.is_empty() {
                vec![ALL_ACTIONS.to_string()]
            } else {
                tracked.iter().map(|a| a.action_name.clone()).collect()
            }
        }
        Some(tracked) => tracked
            .iter()
            .filter(|a| is_expired(a.last_accessed_time, now, window_hours))
            .map(|a| a.action_name.clone())
            .collect(),
    };

    (!actions.is_empty()).then(|| ExpiredService {
        service_name: service.service_name.clone(),
        service_namespace: service.service_namespace.clone(),
        actions: Some(actions),
    })
}

/// Name of the principal: the ARN segment after the last `/`.
pub fn entity_name(entity_arn: &str) -> &str {
    entity_arn
        .rsplit_once('/')
        .map_or(entity_arn, |(_, name)| name)
}

/// Build a report when anything expired; `None` means nothing to report.
pub fn build_report(
    entity_arn: &str,
    services: &[ServiceLastAccessed],
    now: DateTime<Utc>,
    window_hours: u32,
) -> Option<UnusedAccessReport> {
    let expired: Vec<ExpiredService> = services
        .iter()
        .filter_map(|service| classify_service(service, now, window_hours))
        .collect();
    if expired.is_empty() {
        return None;
    }
    Some(UnusedAccessReport {
        entity_arn: entity_arn.to_string(),
        entity_name: entity_name(entity_arn).to_string(),
        total_services: services.len(),
        expired_services: expired.len(),
        expired_service_list: expired,
    })
}
