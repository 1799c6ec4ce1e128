pub mod builders;
pub mod recording_executor;

use std::sync::Once;

use initiator::{AppContext, Environment};
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_names(true)
            .init();
    });
}

/// Environment for the primary process, driven by the calling thread.
pub fn primary_env() -> Environment {
    Environment::new(AppContext::primary("com.example.app"))
}

/// Environment for a secondary process, driven by the calling thread.
pub fn secondary_env() -> Environment {
    Environment::new(AppContext::new("com.example.app", "com.example.app:push"))
}
