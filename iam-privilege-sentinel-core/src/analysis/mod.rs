//! Unused-access analysis over IAM service-last-accessed reports

pub mod report_job;
pub mod unused;

pub use report_job::{run_report_job, ReportJobOutcome, RetryPolicy};
pub use unused::{build_report, classify_service, entity_name, ACTION_LEVEL_SERVICES, ALL_ACTIONS};

use crate::aws::AwsResult;
use crate::types::ReportPage;
use async_trait::async_trait;

/// The asynchronous access-report API of IAM.
#[async_trait]
pub trait AccessReportSource: Send + Sync {
    /// Start an action-level report job; returns the job id.
    async fn generate_report(&self, entity_arn: &str) -> AwsResult<String>;

    /// Fetch one page of a job; `marker` is the continuation from the previous page.
    async fn report_page(&self, job_id: &str, marker: Option<&str>) -> AwsResult<ReportPage>;
}
