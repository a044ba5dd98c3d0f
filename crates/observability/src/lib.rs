//! Process-wide logging setup for the roadworks services.

/// Tracing subscriber configuration (filters, JSON formatting).
pub mod tracing;

/// Install the JSON subscriber with the default `info` filter.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init_with_default_filter(tracing::DEFAULT_FILTER);
}
