//! Tracing Setup
//!
//! Structured logging via `tracing` with env-filter control.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: log level filter (the crate defaults to `info`)

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the global tracing subscriber.
///
/// Call once at startup; a second call panics because the global
/// subscriber is already installed.
#[allow(clippy::expect_used)]
pub fn init() {
    let env_filter = EnvFilter::from_default_env().add_directive(
        "saxo_stream_listener=info"
            .parse()
            .expect("static directive 'saxo_stream_listener=info' is valid"),
    );

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
