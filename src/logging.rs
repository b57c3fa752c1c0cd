//! `tracing` subscriber setup.
//!
//! Diagnostics go to stderr so command output on stdout stays clean.
//! `RUST_LOG` wins over the configured `[logging].level` when set.

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. A second call is a no-op.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
