//! Command-line interface definitions.
//!
//! `run` starts the webhook server, `check config` validates a configuration
//! file, and `parse` runs a notification through the parser and entry-time
//! resolver without trading.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Webhook-driven martingale trade sequencer
#[derive(Parser, Debug)]
#[command(name = "stakeladder")]
#[command(version, about)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the webhook server (foreground)
    Run(RunArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),

    /// Parse a notification file and show the resolved entry time
    Parse(ParseArgs),
}

/// Subcommands for `stakeladder check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file syntax and semantics.
    Config(ConfigPathArg),
}

/// Shared argument for commands that only need a configuration path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Override the listen address (host:port).
    #[arg(long)]
    pub bind: Option<String>,

    /// Override the log level.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON.
    #[arg(long)]
    pub json_logs: bool,

    /// Override the status file path.
    #[arg(long)]
    pub status_file: Option<PathBuf>,
}

/// Arguments for the `parse` subcommand.
#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// File holding the notification text; `-` reads stdin.
    pub file: PathBuf,

    /// Path to the configuration file. Defaults apply when it is missing.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}
