pub mod data;
pub mod harness;

use std::sync::Once;

use tracing_subscriber::EnvFilter;

#[allow(dead_code)]
static INIT: Once = Once::new();

/// Routes `tracing` output through the test writer; `RUST_LOG` picks the
/// level, silent by default.
#[allow(dead_code)]
pub fn init_tracing_for_tests() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
