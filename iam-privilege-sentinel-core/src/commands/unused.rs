//! Scheduled unused-access review of one principal

use crate::analysis::{build_report, run_report_job, AccessReportSource, ReportJobOutcome, RetryPolicy};
use crate::error::SentinelResult;
use crate::notify::{templates, NotificationSink, PublishReceipt};
use crate::types::UnusedAccessReport;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusedAccessSettings {
    pub entity_arn: String,
    /// Hours after which an unused service or action counts as expired.
    pub window_hours: u32,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnusedAccessOutcome {
    NothingExpired {
        entity_arn: String,
        total_services: usize,
    },
    Notified {
        report: UnusedAccessReport,
        receipt: PublishReceipt,
    },
    /// The report job did not complete. No notification was sent.
    Aborted {
        entity_arn: String,
        reason: String,
        retryable: bool,
    },
}

/// Run the access report for the configured principal and notify about expired permissions.
///
/// A job that cannot be submitted, finished or paged ends as `Aborted`;
/// only a failed publish is an error.
pub async fn report_unused_access<S, N>(
    settings: &UnusedAccessSettings,
    now: DateTime<Utc>,
    source: &S,
    sink: &N,
) -> SentinelResult<UnusedAccessOutcome>
where
    S: AccessReportSource + ?Sized,
    N: NotificationSink + ?Sized,
{
    let entity_arn = settings.entity_arn.clone();
    let services = match run_report_job(source, &entity_arn, &settings.retry).await {
        ReportJobOutcome::Completed(services) => services,
        ReportJobOutcome::Retryable { reason } => {
            warn!("Unused-access report for {} abandoned: {}", entity_arn, reason);
            return Ok(UnusedAccessOutcome::Aborted {
                entity_arn,
                reason,
                retryable: true,
            });
        }
        ReportJobOutcome::Failed { job_id, reason } => {
            warn!("Report job {} for {} failed: {}", job_id, entity_arn, reason);
            return Ok(UnusedAccessOutcome::Aborted {
                entity_arn,
                reason,
                retryable: false,
            });
        }
    };

    let Some(report) = build_report(&entity_arn, &services, now, settings.window_hours) else {
        info!(
            "No expired permissions for {} across {} services",
            entity_arn,
            services.len()
        );
        return Ok(UnusedAccessOutcome::NothingExpired {
            entity_arn,
            total_services: services.len(),
        });
    };

    info!(
        "{} of {} services expired for {}",
        report.expired_services, report.total_services, report.entity_name
    );
    let receipt = sink.publish(&templates::unused_access(&report)).await?;
    Ok(UnusedAccessOutcome::Notified { report, receipt })
}
