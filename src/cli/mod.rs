//! Command-line interface: fitting posteriors, choosing moves and
//! generating training data.

pub mod commands;
pub mod config;
pub mod output;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "NBTTT_LOG";

/// Install the global tracing subscriber.
///
/// `NBTTT_LOG` takes precedence; otherwise `verbose` selects `debug` over `info`.
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
