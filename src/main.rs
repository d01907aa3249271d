//! `vtshim` - view-transition lifecycle coordinator

use clap::Parser;

use vtshim::cli::args::Cli;
use vtshim::cli::commands;
use vtshim::error::ExitCode;
use vtshim::observability::{LogFormat, init_logging};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(LogFormat::Human, cli.verbose, cli.color);
    }

    let result = tokio::select! {
        result = commands::dispatch(cli) => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\ninterrupted");
            std::process::exit(ExitCode::INTERRUPTED);
        }
    };

    match result {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
