//! Shared start-up code for the IAM Privilege Sentinel Lambda handlers:
//! - Environment configuration (`config`)
//! - Logger initialisation (`logging`)
//! - Cold-start and response helpers (`runtime`)
//!

pub mod config;
pub mod logging;
pub mod runtime;
