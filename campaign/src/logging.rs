//! Diagnostic tracing for the campaign CLI.
//!
//! Tracing goes to stderr so that stdout stays reserved for command output
//! (`next` excerpts are piped straight into agent prompts). The store and the
//! markdown view are the durable record; nothing here is persisted.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `warn` if unset, so warnings about unknown
/// paths or failed worker runs are visible without configuration.
///
/// # Example
/// ```bash
/// RUST_LOG=campaign=debug campaign --kind audit loop
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
