//! Scheduled review of the configured principal's unused services and actions.

use chrono::Utc;
use iam_privilege_sentinel_core::aws::sns_client::SnsTopic;
use iam_privilege_sentinel_core::commands::{report_unused_access, UnusedAccessSettings};
use iam_privilege_sentinel_core::SentinelService;
use iam_privilege_sentinel_lambda::config::UnusedAccessConfig;
use iam_privilege_sentinel_lambda::runtime;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::debug;
use serde_json::Value;

async fn handler(
    event: LambdaEvent<Value>,
    service: &SentinelService,
    settings: &UnusedAccessSettings,
    topic: &SnsTopic,
) -> Result<Value, Error> {
    debug!("Scheduled event: {}", event.payload);
    runtime::respond(report_unused_access(settings, Utc::now(), service.iam(), topic).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let (config, service) = runtime::start::<UnusedAccessConfig>().await?;
    let settings = config.settings();
    let topic = service.topic(&config.topic.sns_topic_arn);
    let (service, settings, topic) = (&service, &settings, &topic);

    run(service_fn(move |event: LambdaEvent<Value>| async move {
        handler(event, service, settings, topic).await
    }))
    .await
}
