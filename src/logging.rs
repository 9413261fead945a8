//! Log setup.
//!
//! stdout belongs to the game protocol, so every log line goes to stderr.
//! The filter comes from `DRYDOCK_LOG` and uses the usual `EnvFilter`
//! directive syntax (`info`, `drydock::resolve=trace`, ...).

use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "DRYDOCK_LOG";
pub const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber. Returns false if one was already set.
pub fn init_logging() -> bool {
    let directives = std::env::var(LOG_ENV).ok();
    fmt()
        .with_env_filter(build_env_filter(directives.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(false)
        .try_init()
        .is_ok()
}

/// Parses `directives`, falling back to `DEFAULT_FILTER` when they are
/// missing, blank or malformed.
fn build_env_filter(directives: Option<&str>) -> EnvFilter {
    match directives.map(str::trim) {
        Some(d) if !d.is_empty() => {
            EnvFilter::try_new(d).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
        }
        _ => EnvFilter::new(DEFAULT_FILTER),
    }
}
