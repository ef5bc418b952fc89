//! Forwards Access Analyzer unused-access findings to the report topic.

use iam_privilege_sentinel_core::aws::sns_client::SnsTopic;
use iam_privilege_sentinel_core::commands::report_unused_finding;
use iam_privilege_sentinel_core::SentinelService;
use iam_privilege_sentinel_lambda::config::NotifyConfig;
use iam_privilege_sentinel_lambda::runtime;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;

async fn handler(
    event: LambdaEvent<Value>,
    service: &SentinelService,
    topic: &SnsTopic,
) -> Result<Value, Error> {
    runtime::respond(report_unused_finding(&event.payload, service.analyzer(), topic).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let (config, service) = runtime::start::<NotifyConfig>().await?;
    let topic = service.topic(&config.topic.sns_topic_arn);
    let (service, topic) = (&service, &topic);

    run(service_fn(move |event: LambdaEvent<Value>| async move {
        handler(event, service, topic).await
    }))
    .await
}
