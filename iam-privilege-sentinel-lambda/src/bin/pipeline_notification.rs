//! Reports CodeBuild results of the policy validation pipeline.

use iam_privilege_sentinel_core::aws::sns_client::SnsTopic;
use iam_privilege_sentinel_core::commands::report_pipeline_build;
use iam_privilege_sentinel_lambda::config::NotifyConfig;
use iam_privilege_sentinel_lambda::runtime;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;

async fn handler(event: LambdaEvent<Value>, topic: &SnsTopic) -> Result<Value, Error> {
    runtime::respond(report_pipeline_build(&event.payload, topic).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let (config, service) = runtime::start::<NotifyConfig>().await?;
    let topic = service.topic(&config.topic.sns_topic_arn);
    let topic = &topic;

    run(service_fn(move |event: LambdaEvent<Value>| async move {
        handler(event, topic).await
    }))
    .await
}
