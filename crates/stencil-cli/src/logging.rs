// Logging and verbosity control

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter directive for the given CLI flags.
///
/// `--quiet` wins over `--verbose`.
pub fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Install the stderr subscriber. `RUST_LOG` overrides the flags.
pub fn init_logging(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    // A subscriber may already be installed when embedded or under test
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
