//! Tracing subscriber initialization.
//!
//! The engine only emits events through `tracing`; whoever embeds it picks
//! the subscriber. `RUST_LOG` controls the filter in both variants.

use tracing_subscriber::EnvFilter;

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// JSON logs with timestamps, `info` unless `RUST_LOG` says otherwise.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter("info"))
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("json subscriber installed");
    }
}

/// Compact logs routed through the test writer so `cargo test` captures
/// them per test. Defaults to `debug` for the splitbook crates.
pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter("warn,splitbook_engine=debug,splitbook_journal=debug"))
        .with_test_writer()
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialization_is_harmless() {
        init_for_tests();
        init_for_tests();
        init();
        tracing::info!("still logging");
    }
}
