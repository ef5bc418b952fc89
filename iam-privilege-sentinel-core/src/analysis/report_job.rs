//! Submit-and-poll driver for IAM service-last-accessed report jobs

use super::AccessReportSource;
use crate::types::{JobStatus, ServiceLastAccessed};
use log::{error, info, warn};
use std::time::Duration;

/// Bounds for the submit retry loop and the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub submit_attempts: u32,
    pub submit_delay: Duration,
    pub poll_attempts: u32,
    pub poll_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            submit_attempts: 10,
            submit_delay: Duration::from_secs(1),
            poll_attempts: 60,
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// How a report job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportJobOutcome {
    Completed(Vec<ServiceLastAccessed>),
    /// Gave up before the job finished; a later run may succeed.
    Retryable { reason: String },
    /// The job itself reported `FAILED`.
    Failed { job_id: String, reason: String },
}

/// Submit a report for `entity_arn` and collect every page of the result.
pub async fn run_report_job<S>(
    source: &S,
    entity_arn: &str,
    policy: &RetryPolicy,
) -> ReportJobOutcome
where
    S: AccessReportSource + ?Sized,
{
    let job_id = match submit(source, entity_arn, policy).await {
        Ok(job_id) => job_id,
        Err(reason) => return ReportJobOutcome::Retryable { reason },
    };
    info!("Report job {} submitted for {}", job_id, entity_arn);
    poll(source, entity_arn, &job_id, policy).await
}

async fn submit<S>(source: &S, entity_arn: &str, policy: &RetryPolicy) -> Result<String, String>
where
    S: AccessReportSource + ?Sized,
{
    let mut last_error = String::from("no submit attempts configured");
    for attempt in 1..=policy.submit_attempts {
        match source.generate_report(entity_arn).await {
            Ok(job_id) => return Ok(job_id),
            Err(e) => {
                error!(
                    "Generate report for entity {} failed (attempt {}/{}): {}",
                    entity_arn, attempt, policy.submit_attempts, e
                );
                last_error = e.to_string();
            }
        }
        if attempt < policy.submit_attempts {
            tokio::time::sleep(policy.submit_delay).await;
        }
    }
    Err(format!(
        "report generation failed after {} attempts: {}",
        policy.submit_attempts, last_error
    ))
}

async fn poll<S>(
    source: &S,
    entity_arn: &str,
    job_id: &str,
    policy: &RetryPolicy,
) -> ReportJobOutcome
where
    S: AccessReportSource + ?Sized,
{
    for attempt in 1..=policy.poll_attempts {
        let page = match source.report_page(job_id, None).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Fetching report {} failed (poll {}): {}", job_id, attempt, e);
                tokio::time::sleep(policy.poll_interval).await;
                continue;
            }
        };

        match page.status {
            JobStatus::InProgress => {
                tokio::time::sleep(policy.poll_interval).await;
            }
            JobStatus::Failed => {
                let reason = page.error.unwrap_or_else(|| "no error details".to_string());
                error!("Entity {} job {} FAILED: {}", entity_arn, job_id, reason);
                return ReportJobOutcome::Failed {
                    job_id: job_id.to_string(),
                    reason,
                };
            }
            JobStatus::Completed => {
                let mut services = page.services;
                let mut marker = page.marker;
                while let Some(next) = marker.filter(|m| !m.is_empty()) {
                    match source.report_page(job_id, Some(next.as_str())).await {
                        Ok(page) => {
                            services.extend(page.services);
                            marker = page.marker;
                        }
                        Err(e) => {
                            error!("Fetching report {} page failed: {}", job_id, e);
                            return ReportJobOutcome::Retryable {
                                reason: format!("pagination of job {job_id} failed: {e}"),
                            };
                        }
                    }
                }
                info!(
                    "Report job {} completed with {} services",
                    job_id,
                    services.len()
                );
                return ReportJobOutcome::Completed(services);
            }
        }
    }
    ReportJobOutcome::Retryable {
        reason: format!(
            "job {job_id} did not finish after {} polls",
            policy.poll_attempts
        ),
    }
}
