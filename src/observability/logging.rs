//! Logging initialization for `vtshim`.
//!
//! Structured logging via `tracing` with human-readable and JSON output,
//! verbosity from the command line, and an environment override via
//! `VTSHIM_LOG_LEVEL`.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Environment variable that overrides the verbosity flags.
pub const LOG_LEVEL_ENV: &str = "VTSHIM_LOG_LEVEL";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable format with optional ANSI colors.
    #[default]
    Human,
    /// Newline-delimited JSON for machine consumption.
    Json,
}

/// Maps a verbosity level to a tracing directive string.
///
/// - 0 → `"warn"`
/// - 1 → `"info"`
/// - 2 → `"debug"`
/// - 3+ → `"trace"` (saturates)
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Builds the log filter.
///
/// A parseable `override_directives` (the value of `VTSHIM_LOG_LEVEL`)
/// wins; otherwise the filter follows `verbosity`.
#[must_use]
pub fn log_filter(override_directives: Option<&str>, verbosity: u8) -> EnvFilter {
    override_directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(verbosity_to_directive(verbosity)))
}

/// Decides whether log output gets ANSI colors.
///
/// `Auto` colors only a terminal, and never when `NO_COLOR` is set.
#[must_use]
pub const fn use_ansi(color: ColorChoice, is_terminal: bool, no_color: bool) -> bool {
    match color {
        ColorChoice::Auto => is_terminal && !no_color,
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    }
}

/// Initializes the global tracing subscriber on stderr.
///
/// If `VTSHIM_LOG_LEVEL` is set to a valid filter it takes precedence over
/// `verbosity`. Uses `try_init()`, so calling this more than once is
/// harmless.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let override_directives = std::env::var(LOG_LEVEL_ENV).ok();
    let filter = log_filter(override_directives.as_deref(), verbosity);
    let show_target = verbosity >= 2;
    let ansi = use_ansi(
        color,
        std::io::stderr().is_terminal(),
        std::env::var_os("NO_COLOR").is_some(),
    );

    match format {
        LogFormat::Human => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(ansi)
                .with_target(show_target)
                .with_writer(std::io::stderr)
                .try_init();
        }
        LogFormat::Json => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_target(show_target)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
