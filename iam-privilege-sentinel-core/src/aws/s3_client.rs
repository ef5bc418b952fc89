//! S3 object holding the privileged-action list

use crate::aws::{AwsError, AwsResult};
use crate::matching::PatternSource;
use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use log::info;

pub struct S3PatternSource {
    client: S3Client,
    bucket: String,
    key: String,
}

impl S3PatternSource {
    pub fn new(client: S3Client, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

#[async_trait]
impl PatternSource for S3PatternSource {
    async fn fetch_patterns(&self) -> AwsResult<String> {
        info!("Reading privileged actions from s3://{}/{}", self.bucket, self.key);
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await
            .map_err(|e| {
                AwsError::S3Error(format!(
                    "Failed to get s3://{}/{}: {e:?}",
                    self.bucket, self.key
                ))
            })?;
        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| AwsError::S3Error(format!("Failed to read object body: {e}")))?
            .into_bytes();
        String::from_utf8(bytes.to_vec())
            .map_err(|e| AwsError::S3Error(format!("Privileged action list is not UTF-8: {e}")))
    }
}
