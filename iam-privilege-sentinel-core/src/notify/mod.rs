//! Notification delivery: the sink seam and the report templates

pub mod templates;

use crate::aws::AwsResult;
use async_trait::async_trait;
use serde::Serialize;

/// A rendered message ready for publishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Fan-out messages are published without a subject.
    pub subject: Option<String>,
    pub body: String,
}

impl Notification {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            body: body.into(),
        }
    }

    pub fn without_subject(body: impl Into<String>) -> Self {
        Self {
            subject: None,
            body: body.into(),
        }
    }
}

/// Acknowledgement returned by the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReceipt {
    pub message_id: Option<String>,
}

/// A single publish/subscribe destination.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, notification: &Notification) -> AwsResult<PublishReceipt>;
}
