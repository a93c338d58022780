//! Diagnostic logging setup.
//!
//! Logs go to stderr so stdout stays machine-readable with `--format json`.
//! `RUST_LOG` takes precedence; otherwise the level comes from `-v` and the
//! config `debug` flag.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Level used when `RUST_LOG` is not set.
pub fn default_level(verbosity: u8, debug: bool) -> LevelFilter {
    match (verbosity, debug) {
        (0 | 1, true) => LevelFilter::DEBUG,
        (0, false) => LevelFilter::WARN,
        (1, false) => LevelFilter::INFO,
        (2, _) => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(verbosity: u8, debug: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level(verbosity, debug).into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
