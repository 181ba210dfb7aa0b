//! Subscriber setup for the `spec-rewrite` binary.

use tracing_subscriber::{prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "warn";

/// Installs the global subscriber. Logs go to stderr so stdout stays free
/// for the rewritten document and the report.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if json {
        tracing_subscriber::registry()
            .with(layer.json().flatten_event(true))
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry().with(layer).with(filter).try_init()
    };

    if result.is_ok() {
        tracing::debug!(json, "logging initialized");
    }
}
