//! Tracing subscriber setup.

use crate::config::Config;
use tracing_subscriber::EnvFilter;

/// Builds the env filter from `RUST_LOG`, falling back to the configured level.
fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()))
}

/// Installs the global tracing subscriber.
///
/// `LOG_FORMAT=json` switches to newline-delimited JSON output; anything else
/// keeps the human-readable format. Safe to call more than once; later calls
/// are no-ops.
pub fn init(config: &Config) {
    let filter = build_env_filter(&config.log_level);

    if config.log_format.eq_ignore_ascii_case("json") {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
}
