//! `tracing` subscriber setup for the CLI and tests.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// The filter comes from `RUST_LOG` (default `info`), e.g. `RUST_LOG=client_batch_validator=debug`.
/// Output goes to stderr so stdout stays free for results.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// Subscriber for tests: debug level, captured by the test harness. Safe to call repeatedly.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
