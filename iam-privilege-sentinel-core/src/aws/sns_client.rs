//! SNS topic used as the notification sink

use crate::aws::{AwsError, AwsResult};
use crate::notify::{Notification, NotificationSink, PublishReceipt};
use async_trait::async_trait;
use aws_sdk_sns::Client as SnsClient;

pub struct SnsTopic {
    client: SnsClient,
    topic_arn: String,
}

impl SnsTopic {
    pub fn new(client: SnsClient, topic_arn: impl Into<String>) -> Self {
        Self {
            client,
            topic_arn: topic_arn.into(),
        }
    }
}

#[async_trait]
impl NotificationSink for SnsTopic {
    async fn publish(&self, notification: &Notification) -> AwsResult<PublishReceipt> {
        let response = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .message(&notification.body)
            .set_subject(notification.subject.clone())
            .send()
            .await
            .map_err(|e| {
                AwsError::SnsError(format!(
                    "Failed to publish to '{}': {e:?}",
                    self.topic_arn
                ))
            })?;
        Ok(PublishReceipt {
            message_id: response.message_id().map(str::to_string),
        })
    }
}
