//! Diagnostics output
//!
//! The runtime only emits `tracing` events. Embedders that already install a
//! subscriber can skip [`init`]; otherwise it sets up a stderr fmt subscriber.

use tracing_subscriber::{EnvFilter, FmtSubscriber};
use unsafe_config::bridge::DEFAULT_LOG_FILTER;
use unsafe_config::LoggingConfig;

/// Install a global fmt subscriber filtered by `config.filter`
///
/// Returns `false` when a global subscriber was already set. An unparsable filter
/// falls back to the default directive.
pub fn init(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|e| {
        eprintln!(
            "unsafe-ext: invalid log filter '{}' ({}), using '{}'",
            config.filter, e, DEFAULT_LOG_FILTER
        );
        EnvFilter::new(DEFAULT_LOG_FILTER)
    });

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).is_ok()
}
