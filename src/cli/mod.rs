//! Command-line interface for Keyrace
//!
//! Argument parsing with clap, logging setup, and dispatch to the command
//! implementations in [`commands`].

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod commands;
mod output;

pub use output::Output;

/// Keyrace - one generator, many searchers, one verifier
#[derive(Parser)]
#[command(name = "keyrace", author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the race
    Run(commands::run::RunArgs),
    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the merged configuration
    Show,
    /// Validate the merged configuration
    Validate,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        setup_logging(self.verbose, self.quiet);
        let output = Output::new(self.verbose > 0, self.quiet);

        match self.command {
            Some(Commands::Run(args)) => commands::run::execute(args, self.config.as_deref(), &output),
            Some(Commands::Config(ConfigCommands::Show)) => {
                commands::config::show(self.config.as_deref())
            }
            Some(Commands::Config(ConfigCommands::Validate)) => {
                commands::config::validate(self.config.as_deref(), &output)
            }
            None => {
                output.info("Run 'keyrace --help' for usage information");
                Ok(())
            }
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info"),
            2 => tracing_subscriber::EnvFilter::new("debug"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    // try_init: a subscriber may already be installed when driven from tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .try_init();
}
