//! IAM Privilege Sentinel Service Layer
//!
//! Holds the AWS clients shared by every handler. Handlers borrow the
//! collaborators they need and pass them to the operations in
//! [`crate::commands`].

use crate::aws::analyzer_client::AwsAccessAnalyzerClient;
use crate::aws::iam_client::AwsIamClient;
use crate::aws::s3_client::S3PatternSource;
use crate::aws::sns_client::SnsTopic;
use aws_sdk_accessanalyzer::Client as AccessAnalyzerClient;
use aws_sdk_iam::Client as IamClient;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_sns::Client as SnsClient;

pub struct SentinelService {
    iam: AwsIamClient,
    analyzer: AwsAccessAnalyzerClient,
    s3_client: S3Client,
    sns_client: SnsClient,
}

impl SentinelService {
    /// Create a new service instance with AWS clients
    ///
    /// The configuration is loaded using the default credential provider
    /// chain, which inside Lambda resolves to the function's execution role.
    pub async fn new() -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;

        Self {
            iam: AwsIamClient::new(IamClient::new(&config)),
            analyzer: AwsAccessAnalyzerClient::new(AccessAnalyzerClient::new(&config)),
            s3_client: S3Client::new(&config),
            sns_client: SnsClient::new(&config),
        }
    }

    pub fn iam(&self) -> &AwsIamClient {
        &self.iam
    }

    pub fn analyzer(&self) -> &AwsAccessAnalyzerClient {
        &self.analyzer
    }

    pub fn pattern_source(&self, bucket: &str, key: &str) -> S3PatternSource {
        S3PatternSource::new(self.s3_client.clone(), bucket, key)
    }

    pub fn topic(&self, topic_arn: &str) -> SnsTopic {
        SnsTopic::new(self.sns_client.clone(), topic_arn)
    }
}
