//! Subscriber setup for the CLI.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! binary's job. `RUST_LOG`, when set, overrides the configured level.
//! Logs go to stderr so stdout carries only command output.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::TryInitError;

/// Filter from `RUST_LOG`, falling back to `level`.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install a compact fmt subscriber writing to stderr.
///
/// Fails if a global subscriber is already set.
pub fn init(level: &str) -> Result<(), TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let format = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(format)
        .try_init()
}
