//! Diagnostics and the per-run log files.
//!
//! Two unrelated kinds of logging live here:
//!
//! - [`init_tracing`] sets up `tracing` diagnostics on stderr for operators.
//! - [`run_log`] writes the run log and error log, the durable record of
//!   what happened to every manifest entry.

pub mod run_log;

pub use run_log::{LogEntry, Outcome, RunLogger};

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `debug` with `verbose`
/// and `warn` without. Calling it twice is harmless.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { "docmerge=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
pub(crate) fn init_for_tests() {
    use std::sync::Once;

    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("docmerge=debug"))
            .with_test_writer()
            .try_init();
    });
}
