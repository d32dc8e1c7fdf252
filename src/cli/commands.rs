//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Customer.io extractor CLI
#[derive(Parser, Debug)]
#[command(name = "tap-customerio")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON or YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline config JSON (takes precedence over --config)
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Show the configuration specification
    Spec,

    /// Test the API credential
    Check,

    /// Print the stream catalog with schemas
    Discover,

    /// Read data from streams
    Read {
        /// Streams to emit (comma-separated, empty = all)
        #[arg(long, value_delimiter = ',')]
        streams: Vec<String>,

        /// Page ceiling per stream/context (overrides config)
        #[arg(long)]
        max_pages: Option<u32>,
    },

    /// List stream names in declared order
    Streams,
}
