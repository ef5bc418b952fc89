//! Checks documents from the fan-out topic against each privileged action with Access Analyzer.

use iam_privilege_sentinel_core::aws::s3_client::S3PatternSource;
use iam_privilege_sentinel_core::aws::sns_client::SnsTopic;
use iam_privilege_sentinel_core::commands::check_privileged_access;
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
        check_privileged_access(&event.payload, &privileged, service.analyzer(), topic).await
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
