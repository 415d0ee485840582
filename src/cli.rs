use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docfixture")]
#[command(about = "Document database fixtures for test suites")]
#[command(version)]
pub struct Cli {
    /// Show debug logs (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Wipe the configured database and load the dump
    Populate {
        /// Config file (default: ./docfixture.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List collections and document counts
    Inspect {
        /// Config file (default: ./docfixture.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Database to inspect instead of the configured one
        #[arg(short, long)]
        database: Option<String>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Resolve the dump file and report its contents without connecting
    CheckDump {
        /// Config file (default: ./docfixture.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate a scenario skeleton for an actor
    Generate {
        /// Actor class name (e.g., AcceptanceTester)
        #[arg(short, long)]
        actor: String,

        /// Namespace of the actor (e.g., App\Acceptance)
        #[arg(short, long)]
        namespace: Option<String>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing output file
        #[arg(long)]
        force: bool,
    },
}
