//! docfixture CLI - document database fixtures for test suites
//!
//! This file contains only CLI dispatch logic. All command implementations
//! are in the `commands/` module.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use docfixture::{Cli, Commands, cmd_check_dump, cmd_generate, cmd_inspect, cmd_populate};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "docfixture=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Populate { config } => cmd_populate(config.as_deref()),
        Commands::Inspect {
            config,
            database,
            format,
        } => cmd_inspect(config.as_deref(), database, &format),
        Commands::CheckDump { config } => cmd_check_dump(config.as_deref()),
        Commands::Generate {
            actor,
            namespace,
            output,
            force,
        } => cmd_generate(actor, namespace, output.as_deref(), force),
    }
}
