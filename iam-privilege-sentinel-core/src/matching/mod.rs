//! Privileged-action list loading and matching

pub mod privileged;

pub use privileged::{match_actions, PrivilegedActionList};

use crate::aws::AwsResult;
use crate::error::SentinelResult;
use async_trait::async_trait;
use log::info;

/// Supplies the raw newline-delimited privileged-action list.
#[async_trait]
pub trait PatternSource: Send + Sync {
    async fn fetch_patterns(&self) -> AwsResult<String>;
}

/// Load and parse the list. Called once per invocation, so edits to the
/// stored list apply from the next event onwards.
pub async fn load_privileged_actions<S>(source: &S) -> SentinelResult<PrivilegedActionList>
where
    S: PatternSource + ?Sized,
{
    let text = source.fetch_patterns().await?;
    let list = PrivilegedActionList::parse(&text)?;
    info!("Loaded {} privileged action patterns", list.len());
    Ok(list)
}
