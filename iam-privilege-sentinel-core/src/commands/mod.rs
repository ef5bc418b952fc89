//! Commands module - end-to-end operations behind each Lambda handler

mod checks;
mod fanout;
mod pipeline;
mod privileged;
pub(crate) mod service;
mod unused;

pub use checks::{check_privileged_access, report_unused_finding, validate_policy_change};
pub use fanout::fan_out_policy_change;
pub use pipeline::report_pipeline_build;
pub use privileged::detect_privileged_actions;
pub use service::SentinelService;
pub use unused::{report_unused_access, UnusedAccessOutcome, UnusedAccessSettings};

use crate::notify::PublishReceipt;
use crate::parsing::Normalized;
use crate::types::PolicyChangeEvent;
use serde::Serialize;

/// What a policy-change handler did with its trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChangeOutcome {
    /// Not one of the supported IAM mutations.
    Ignored { event_name: String },
    /// The managed policy could not be resolved; nothing was evaluated.
    LookupFailed { policy_arn: String, reason: String },
    /// Evaluated, nothing worth reporting.
    NothingToReport { policy_reference: String },
    /// A report listing `reported` items was published.
    Notified {
        policy_reference: String,
        reported: usize,
        receipt: PublishReceipt,
    },
    /// The normalized event was republished for downstream consumers.
    Forwarded {
        policy_reference: String,
        receipt: PublishReceipt,
    },
}

/// Split a normalization result into the event to evaluate or the final outcome.
fn into_change(normalized: Normalized) -> Result<PolicyChangeEvent, ChangeOutcome> {
    match normalized {
        Normalized::Change(event) => Ok(event),
        Normalized::Ignored { event_name } => Err(ChangeOutcome::Ignored { event_name }),
        Normalized::LookupFailed { policy_arn, reason } => {
            Err(ChangeOutcome::LookupFailed { policy_arn, reason })
        }
    }
}
