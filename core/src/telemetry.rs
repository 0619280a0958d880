//! # Telemetry: tracing subscriber setup
//!
//! The adapter and dispatcher only emit `tracing` events; applications decide
//! whether to install a subscriber. This helper installs the fmt subscriber
//! used by the demos.

use crate::error::BoxError;
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Fails if a global subscriber is
/// already installed.
pub fn init_tracing(default_filter: &str) -> Result<(), BoxError> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
}
