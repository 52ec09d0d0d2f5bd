//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dnsfold")]
#[command(author, version, about = "Merge DNS blocklists into one collapsed Adblock list")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (built-in defaults when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch all sources and regenerate the blocklist and optimization report
    Update {
        /// Fetch and process but don't write any file
        #[arg(long)]
        dry_run: bool,

        /// Override the subdomain threshold for promotion
        #[arg(long)]
        threshold: Option<usize>,
    },

    /// List configured sources
    Sources,

    /// Print the effective configuration as YAML
    Config,

    /// Show version
    Version,
}
