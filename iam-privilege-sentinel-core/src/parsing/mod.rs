//! Trigger payload parsing (pure Rust apart from the policy lookup seam)

pub mod build;
pub mod document;
pub mod envelope;
pub mod event;

pub use build::{parse_build_event, BuildReport};
pub use document::{extract_actions, ActionField};
pub use envelope::{decode_sns_message, is_sns_envelope, sns_message};
pub use event::{normalize, normalize_cloudtrail, normalize_envelope, Normalized, PolicyLookup};
