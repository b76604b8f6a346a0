//! Tracing setup for the `splice` binary.
//!
//! Logs always go to stderr. Stdout carries command output only, so
//! `splice probe --json` stays machine-readable with logging enabled.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Filter for `config`. A set `RUST_LOG` replaces the configured level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global subscriber. Later calls keep the first one.
pub fn init_logging(config: &LoggingConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.compact().with_target(false).try_init()
    };
    if installed.is_err() {
        tracing::debug!("Subscriber already installed");
    }
}
