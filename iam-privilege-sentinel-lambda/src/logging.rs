//! Logger setup for the Lambda binaries

use env_logger::{Builder, Env};

/// Initialise `env_logger` once per cold start. `RUST_LOG` overrides the `info` default.
pub fn init() {
    // A second init (e.g. from tests) keeps the first logger.
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_target(false)
        .try_init();
}
