//! Reports privileged actions granted by an IAM policy change.
//!
//! Triggered by EventBridge (CloudTrail API calls) or by the fan-out topic.

use iam_privilege_sentinel_core::aws::s3_client::S3PatternSource;
use iam_privilege_sentinel_core::aws::sns_client::SnsTopic;
use iam_privilege_sentinel_core::commands::detect_privileged_actions;
use iam_privilege_sentinel_core::SentinelService;
use iam_privilege_sentinel_lambda::config::PrivilegedConfig;
use iam_privilege_sentinel_lambda::runtime;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;

async fn handler(
    event: LambdaEvent<Value>,
    service: &SentinelService,
    list: &S3PatternSource,
    topic: &SnsTopic,
) -> Result<Value, Error> {
    runtime::with_privileged_list(list, |privileged| async move {
        detect_privileged_actions(&event.payload, &privileged, service.iam(), topic).await
    })
    .await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let (config, service) = runtime::start::<PrivilegedConfig>().await?;
    let list = service.pattern_source(&config.list.bucket, &config.list.key);
    let topic = service.topic(&config.topic.sns_topic_arn);
    let (service, list, topic) = (&service, &list, &topic);

    run(service_fn(move |event: LambdaEvent<Value>| async move {
        handler(event, service, list, topic).await
    }))
    .await
}
