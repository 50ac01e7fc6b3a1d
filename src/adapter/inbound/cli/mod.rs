//! CLI module graph.

pub mod check;
pub mod command;
pub mod output;
pub mod parse;
pub mod run;

use crate::error::Result;
use command::{CheckCommand, Cli, Commands};

/// Dispatch a parsed command line.
///
/// # Errors
///
/// Propagates the failure of the selected command.
pub async fn dispatch(cli: Cli) -> Result<()> {
    output::configure(
        output::OutputConfig::new(cli.json, cli.quiet, cli.verbose),
        cli.color,
    );
    match cli.command {
        Commands::Run(args) => run::execute(&args).await,
        Commands::Check(CheckCommand::Config(args)) => check::execute_config(&args.config),
        Commands::Parse(args) => parse::execute(&args),
    }
}
