//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Connector command line
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show connector specification
    Spec,

    /// Test connection to the API
    Check {
        /// Configuration file (JSON or YAML)
        #[arg(long)]
        config: PathBuf,
    },

    /// Discover available streams
    Discover {
        /// Configuration file (JSON or YAML)
        #[arg(long)]
        config: PathBuf,
    },

    /// Read data from streams
    Read {
        /// Configuration file (JSON or YAML)
        #[arg(long)]
        config: PathBuf,

        /// Configured catalog file (JSON)
        #[arg(long)]
        catalog: PathBuf,

        /// State file (JSON) to resume from
        #[arg(long)]
        state: Option<PathBuf>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    #[default]
    Json,
    /// Human-readable output
    Pretty,
}
