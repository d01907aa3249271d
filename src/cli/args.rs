//! CLI argument definitions
//!
//! All Clap derive structs for `vtshim` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

// ============================================================================
// Root CLI
// ============================================================================

/// Drive view-transition lifecycles on a simulated render host.
#[derive(Parser, Debug)]
#[command(name = "vtshim", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "VTSHIM_COLOR")]
    pub color: ColorChoice,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List or run built-in transition scenarios.
    Scenario(ScenarioCommand),

    /// Work with coordinator configuration files.
    Config(ConfigCommand),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Scenario Command
// ============================================================================

/// Scenario commands.
#[derive(Args, Debug)]
pub struct ScenarioCommand {
    /// Scenario subcommand.
    #[command(subcommand)]
    pub subcommand: ScenarioSubcommand,
}

/// Scenario subcommands.
#[derive(Subcommand, Debug)]
pub enum ScenarioSubcommand {
    /// List built-in scenarios.
    List(ScenarioListArgs),

    /// Run a built-in scenario and compare the settlement order.
    Run(ScenarioRunArgs),
}

/// Arguments for `scenario list`.
#[derive(Args, Debug)]
pub struct ScenarioListArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `scenario run`.
#[derive(Args, Debug)]
pub struct ScenarioRunArgs {
    /// Scenario name (see `vtshim scenario list`).
    pub name: String,

    /// Path to a YAML coordinator configuration.
    #[arg(short, long, env = "VTSHIM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Write JSONL lifecycle events to this file.
    #[arg(long)]
    pub events_file: Option<PathBuf>,

    /// Pace frames in real time at the configured frame interval.
    #[arg(long)]
    pub paced: bool,

    /// Expose Prometheus metrics on this port while running.
    #[arg(long, env = "VTSHIM_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

// ============================================================================
// Config Command
// ============================================================================

/// Configuration commands.
#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// Config subcommand.
    #[command(subcommand)]
    pub subcommand: ConfigSubcommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Validate a configuration file and print the effective settings.
    Validate(ConfigValidateArgs),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
pub struct ConfigValidateArgs {
    /// Configuration file to validate.
    pub file: PathBuf,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Version
// ============================================================================

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}
