//! Tracing/logging initialization.
//!
//! JSON lines on stdout. The active span list is included in every record so events
//! emitted inside an allocation carry its `complaint_id` and `allocated_by` fields.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Build the `EnvFilter`: `RUST_LOG` if valid, otherwise `default_directive`.
pub fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Initialize tracing for the process.
///
/// Returns `false` if a global subscriber was already installed (the call is then a no-op).
pub fn init_with_default_filter(default_directive: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directive))
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init()
        .is_ok()
}
