//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod config;
pub mod scenario;
pub mod version;

use crate::cli::args::{Cli, Commands, ConfigSubcommand, ScenarioSubcommand};
use crate::error::ShimError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli) -> Result<(), ShimError> {
    match cli.command {
        Commands::Scenario(cmd) => match cmd.subcommand {
            ScenarioSubcommand::List(args) => scenario::list(&args),
            ScenarioSubcommand::Run(args) => scenario::run(&args, cli.quiet).await,
        },
        Commands::Config(cmd) => match cmd.subcommand {
            ConfigSubcommand::Validate(args) => config::validate(&args),
        },
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}
