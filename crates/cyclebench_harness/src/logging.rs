//! Process-wide tracing setup.
//!
//! The harness only emits `tracing` events; installing a subscriber is left
//! to whatever binary or test embeds it, which calls [`init`] once before
//! running a suite. Scenario reports keep their own logs either way.

use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

/// Installs a fmt subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// Calling it again, or after another subscriber was installed, does nothing.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = Registry::default()
        .with(filter)
        .with(subscriber_fmt::layer().with_target(false))
        .try_init();
}
