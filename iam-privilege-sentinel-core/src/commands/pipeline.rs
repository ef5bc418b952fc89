//! CodeBuild results of the policy validation pipeline

use crate::error::{SentinelError, SentinelResult};
use crate::notify::{templates, NotificationSink, PublishReceipt};
use crate::parsing::{parse_build_event, sns_message};
use log::info;
use serde_json::Value;

/// Unwrap the build state change carried by an SNS envelope and report it.
pub async fn report_pipeline_build<N>(envelope: &Value, sink: &N) -> SentinelResult<PublishReceipt>
where
    N: NotificationSink + ?Sized,
{
    let message = sns_message(envelope)?;
    let event: Value = serde_json::from_str(&message)
        .map_err(|e| SentinelError::malformed_event(format!("build message is not JSON: {e}")))?;
    let report = parse_build_event(&event)?;
    info!(
        "Build {} of {} finished with {}",
        report.build_id, report.project_name, report.status
    );
    let receipt = sink.publish(&templates::pipeline_build(&report)).await?;
    info!("Pipeline report sent: {:?}", receipt);
    Ok(receipt)
}
