//! Logging setup for the `lint-presets` binary.
//!
//! Diagnostics go to stderr through `tracing`; stdout is reserved for the
//! rendered configuration.

use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the `-v` derived filter.
pub const LOG_ENV_VAR: &str = "LINT_PRESETS_LOG";

/// Maps a `-v` count to a tracing directive.
///
/// - 0 → `"warn"`
/// - 1 → `"info"`
/// - 2 → `"debug"`
/// - 3+ → `"trace"`
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Safe to call more than once.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_saturates_at_trace() {
        assert_eq!(verbosity_to_directive(0), "warn");
        assert_eq!(verbosity_to_directive(1), "info");
        assert_eq!(verbosity_to_directive(2), "debug");
        assert_eq!(verbosity_to_directive(9), "trace");
    }

    #[test]
    fn init_twice_does_not_panic() {
        init_logging(0);
        init_logging(3);
    }
}
