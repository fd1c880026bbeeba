//! Process-wide `tracing` subscriber.

use tracing_subscriber::EnvFilter;

/// Directives used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Install the JSON subscriber with [`DEFAULT_FILTER`]. Later calls are no-ops.
pub fn init() {
    init_with(DEFAULT_FILTER);
}

pub fn init_with(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // One flat JSON object per event on stderr; stdout belongs to the console.
    let _ = tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
