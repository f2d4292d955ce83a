//! Utilities: logging setup (level from -v/-q, overridable by RUST_LOG),
//! environment lookup helpers.
//!
//! Key items:
//!   derive_level / init_logging
//!   env_non_empty

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Map CLI verbosity flags to a log level. `--quiet` wins over `-v`.
pub fn derive_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the global subscriber. Logs go to stderr so stdout only carries
/// command output. `RUST_LOG`, when set, replaces the derived filter.
pub fn init_logging(level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn default_directives(level: LevelFilter) -> String {
    // Dependencies stay at warn unless the user asks for trace.
    let deps = if level == LevelFilter::TRACE {
        LevelFilter::TRACE
    } else {
        LevelFilter::WARN.min(level)
    };
    format!("{deps},landscape_api={level}")
}

/// Value of an environment variable, ignoring unset and blank values.
pub fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}
