//! Logging setup shared by binaries, tests and benchmarks.

/// Subscriber configuration (filters, formatters).
pub mod subscriber;

/// Initialize process-wide structured logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    subscriber::init();
}

/// Initialize human-readable logging captured by the test harness.
pub fn init_for_tests() {
    subscriber::init_for_tests();
}
