//! Tracing subscriber setup for the command-line tool.
//!
//! Library code only emits `tracing` events; a binary decides where they go.
//! `RUST_LOG` overrides the default level.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn default_filter(verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { "warn" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install a compact stderr subscriber.
///
/// Does nothing if a global subscriber is already set.
pub fn init_logging(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();
}

/// Initialize logging for tests, captured by the test harness.
pub fn init_test_logging() {
    let _ = tracing_subscriber::registry()
        .with(default_filter(true))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_test_writer()
                .compact(),
        )
        .try_init();
}
