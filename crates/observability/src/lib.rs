//! Logging for the waiter workspace: the `tracing` subscriber and the
//! plain-text error log the waiter can hand to support.

/// Install the process-wide tracing subscriber.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

pub mod error_log;
pub mod tracing;

pub use error_log::ErrorLog;
