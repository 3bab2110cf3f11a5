// src/logging.rs
// =============================================================================
// Logging setup.
//
// Human-oriented output goes to stderr so stdout stays clean for the report
// and for the worker wire protocol in `probe-worker`.
// =============================================================================

use tracing_subscriber::EnvFilter;

/// Filter used when RUST_LOG is not set, by number of `-v` flags.
fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,doclinks=info",
        _ => "info,doclinks=debug",
    }
}

/// Installs the global subscriber. RUST_LOG, when set, wins over `verbosity`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
