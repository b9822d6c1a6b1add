//! Log output setup.
//!
//! The library only emits `tracing` events; installing a subscriber is up to
//! the embedding application. [`init_tracing`] is the stock setup: a `fmt`
//! layer on stderr filtered by an [`EnvFilter`] directive, usually
//! [`crate::config::CardboxConfig::log_filter`].

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber.
///
/// An unparsable directive falls back to `info`. Returns `false` if a global
/// subscriber was already installed, leaving that one in place.
pub fn init_tracing(filter: &str) -> bool {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()
        .is_ok()
}
