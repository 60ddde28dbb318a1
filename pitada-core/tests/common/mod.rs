//! Shared setup for the integration suites.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install the log subscriber once per test binary. Honors `RUST_LOG`, so
/// degraded-read warnings can be surfaced when debugging a failing test.
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}
