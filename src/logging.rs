//! Subscriber setup for the `docgraph` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to whoever embeds it. `RUST_LOG` wins over the configured level.

use crate::config::LoggingConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter from `RUST_LOG`, else from the configured level.
pub fn filter_for(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("warn"))
    })
}

/// Install the global subscriber. Logs go to stderr so stdout stays parseable.
///
/// Calling it twice is harmless; the second call leaves the first subscriber in place.
pub fn init(config: &LoggingConfig) {
    let filter = filter_for(config);
    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    if let Err(e) = result {
        tracing::debug!("Logging already initialised: {e}");
    }
}
