//! Logging setup for native consumers and test binaries.

use tracing_subscriber::{EnvFilter, prelude::*};

/// Initialize logging
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("error,client=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_line_number(true)
        .with_target(false)
        .with_writer(std::io::stderr);

    // try_init so repeated calls from test binaries are harmless
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}
