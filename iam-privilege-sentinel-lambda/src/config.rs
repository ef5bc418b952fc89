//! Handler configuration read from the Lambda environment
//!
//! Every handler is configured through environment variables only. The
//! structs are clap parsers so that a missing or empty variable fails the
//! cold start with a message naming it.

use anyhow::{Context, Result};
use clap::builder::NonEmptyStringValueParser;
use clap::{ArgGroup, Args, Parser};
use iam_privilege_sentinel_core::analysis::RetryPolicy;
use iam_privilege_sentinel_core::commands::UnusedAccessSettings;
use std::time::Duration;

/// Destination topic for reports (or for fan-out messages).
#[derive(Debug, Clone, Args)]
pub struct TopicConfig {
    #[arg(long, env = "SNS_TOPIC_ARN", value_parser = NonEmptyStringValueParser::new())]
    pub sns_topic_arn: String,
}

/// Location of the privileged-action list object.
#[derive(Debug, Clone, Args)]
pub struct PatternListConfig {
    #[arg(long, env = "BUCKET", value_parser = NonEmptyStringValueParser::new())]
    pub bucket: String,

    #[arg(long, env = "KEY", value_parser = NonEmptyStringValueParser::new())]
    pub key: String,
}

/// Handlers that only publish.
#[derive(Debug, Clone, Parser)]
pub struct NotifyConfig {
    #[command(flatten)]
    pub topic: TopicConfig,
}

/// Handlers that also evaluate against the privileged-action list.
#[derive(Debug, Clone, Parser)]
pub struct PrivilegedConfig {
    #[command(flatten)]
    pub topic: TopicConfig,

    #[command(flatten)]
    pub list: PatternListConfig,
}

/// The hosting stack sets `role_arn` and `HoursExpire`; the upper-case
/// spellings are accepted too. When both are set the stack's names win.
#[derive(Debug, Clone, Parser)]
#[command(group(ArgGroup::new("principal").required(true).multiple(true)))]
#[command(group(ArgGroup::new("window").required(true).multiple(true)))]
pub struct UnusedAccessConfig {
    #[command(flatten)]
    pub topic: TopicConfig,

    /// Principal whose access history is reviewed.
    #[arg(long, env = "role_arn", group = "principal", value_parser = NonEmptyStringValueParser::new())]
    role_arn: Option<String>,

    #[arg(long, env = "ROLE_ARN", group = "principal", hide = true, value_parser = NonEmptyStringValueParser::new())]
    role_arn_upper: Option<String>,

    /// Hours without use after which a permission is reported.
    #[arg(long, env = "HoursExpire", group = "window")]
    hours_expire: Option<u32>,

    #[arg(long, env = "HOURS_EXPIRE", group = "window", hide = true)]
    hours_expire_upper: Option<u32>,

    #[arg(long, env = "SUBMIT_ATTEMPTS", default_value_t = 10)]
    pub submit_attempts: u32,

    #[arg(long, env = "SUBMIT_DELAY_MS", default_value_t = 1000)]
    pub submit_delay_ms: u64,

    #[arg(long, env = "POLL_ATTEMPTS", default_value_t = 60)]
    pub poll_attempts: u32,

    #[arg(long, env = "POLL_INTERVAL_MS", default_value_t = 2000)]
    pub poll_interval_ms: u64,
}

impl UnusedAccessConfig {
    pub fn role_arn(&self) -> &str {
        self.role_arn
            .as_deref()
            .or(self.role_arn_upper.as_deref())
            .unwrap_or_default()
    }

    pub fn hours_expire(&self) -> u32 {
        self.hours_expire
            .or(self.hours_expire_upper)
            .unwrap_or_default()
    }

    pub fn settings(&self) -> UnusedAccessSettings {
        UnusedAccessSettings {
            entity_arn: self.role_arn().to_string(),
            window_hours: self.hours_expire(),
            retry: RetryPolicy {
                submit_attempts: self.submit_attempts,
                submit_delay: Duration::from_millis(self.submit_delay_ms),
                poll_attempts: self.poll_attempts,
                poll_interval: Duration::from_millis(self.poll_interval_ms),
            },
        }
    }
}

/// Parse a handler configuration from the environment alone.
pub fn from_env<C: Parser>() -> Result<C> {
    C::try_parse_from([env!("CARGO_PKG_NAME")])
        .context("Invalid handler configuration in the Lambda environment")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_settings_default_when_unset() {
        let config = UnusedAccessConfig::try_parse_from([
            "unused-access",
            "--sns-topic-arn",
            "arn:aws:sns:eu-west-1:123456789012:reports",
            "--role-arn",
            "arn:aws:iam::123456789012:role/app",
            "--hours-expire",
            "24",
        ])
        .unwrap();

        let settings = config.settings();
        assert_eq!(settings.entity_arn, "arn:aws:iam::123456789012:role/app");
        assert_eq!(settings.window_hours, 24);
        assert_eq!(settings.retry, RetryPolicy::default());
    }

    #[test]
    fn test_non_numeric_window_is_rejected() {
        let result = UnusedAccessConfig::try_parse_from([
            "unused-access",
            "--sns-topic-arn",
            "arn:aws:sns:eu-west-1:123456789012:reports",
            "--role-arn",
            "arn:aws:iam::123456789012:role/app",
            "--hours-expire",
            "a day",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_principal_and_window_are_required() {
        let result = UnusedAccessConfig::try_parse_from([
            "unused-access",
            "--sns-topic-arn",
            "arn:aws:sns:eu-west-1:123456789012:reports",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_bucket_is_rejected() {
        let result = PrivilegedConfig::try_parse_from([
            "privileged-actions",
            "--sns-topic-arn",
            "arn:aws:sns:eu-west-1:123456789012:reports",
            "--bucket",
            "",
            "--key",
            "privileged.txt",
        ]);
        assert!(result.is_err());
    }
}
