//! CodeBuild state-change events forwarded by the policy pipeline

use crate::error::{SentinelError, SentinelResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const FAILED_PHASE: &str = "FAILED";

/// Summary of a finished build of the policy validation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    pub build_id: String,
    pub status: String,
    pub project_name: String,
    pub initiator: Option<String>,
    pub build_start_time: Option<String>,
    pub logs_link: Option<String>,
    /// `phase-context` of every phase whose status is `FAILED`, in phase order.
    pub failed_phase_contexts: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct BuildStateChange {
    detail: BuildDetail,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct BuildDetail {
    build_status: String,
    build_id: String,
    project_name: String,
    #[serde(default)]
    additional_information: AdditionalInformation,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct AdditionalInformation {
    initiator: Option<String>,
    build_start_time: Option<String>,
    logs: Option<BuildLogs>,
    #[serde(default)]
    phases: Vec<BuildPhase>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct BuildLogs {
    deep_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct BuildPhase {
    phase_status: Option<String>,
    #[serde(default)]
    phase_context: Value,
}

pub fn parse_build_event(event: &Value) -> SentinelResult<BuildReport> {
    let change = BuildStateChange::deserialize(event).map_err(|e| {
        SentinelError::malformed_event(format!("not a CodeBuild state change: {e}"))
    })?;
    let detail = change.detail;
    let info = detail.additional_information;

    let failed_phase_contexts = info
        .phases
        .into_iter()
        .filter(|phase| phase.phase_status.as_deref() == Some(FAILED_PHASE))
        .map(|phase| phase.phase_context)
        .collect();

    Ok(BuildReport {
        build_id: detail.build_id,
        status: detail.build_status,
        project_name: detail.project_name,
        initiator: info.initiator,
        build_start_time: info.build_start_time,
        logs_link: info.logs.and_then(|logs| logs.deep_link),
        failed_phase_contexts,
    })
}
