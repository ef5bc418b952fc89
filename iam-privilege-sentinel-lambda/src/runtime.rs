//! Glue shared by every handler binary

use crate::{config, logging};
use anyhow::Result;
use clap::Parser;
use iam_privilege_sentinel_core::matching::{
    load_privileged_actions, PatternSource, PrivilegedActionList,
};
use iam_privilege_sentinel_core::{SentinelResult, SentinelService};
use lambda_runtime::Error;
use log::{error, info};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;

/// Cold-start setup: logging, configuration and AWS clients.
pub async fn start<C: Parser>() -> Result<(C, SentinelService)> {
    logging::init();
    let config = config::from_env::<C>()?;
    let service = SentinelService::new().await;
    info!("{} ready", env!("CARGO_PKG_NAME"));
    Ok((config, service))
}

/// Turn an operation result into the handler response.
///
/// Outcomes are returned as JSON. Errors are logged and fail the invocation.
pub fn respond<T: Serialize>(result: SentinelResult<T>) -> Result<Value, Error> {
    match result {
        Ok(outcome) => {
            let response = serde_json::to_value(&outcome)?;
            info!("Invocation finished: {}", response);
            Ok(response)
        }
        Err(e) => {
            error!("Invocation failed: {}", e);
            Err(e.into())
        }
    }
}

/// Load the privileged-action list, then evaluate with it. A failed load is
/// answered like any other failed invocation.
pub async fn with_privileged_list<S, F, Fut, T>(source: &S, evaluate: F) -> Result<Value, Error>
where
    S: PatternSource + ?Sized,
    F: FnOnce(PrivilegedActionList) -> Fut,
    Fut: Future<Output = SentinelResult<T>>,
    T: Serialize,
{
    let result = match load_privileged_actions(source).await {
        Ok(privileged) => evaluate(privileged).await,
        Err(e) => Err(e),
    };
    respond(result)
}
