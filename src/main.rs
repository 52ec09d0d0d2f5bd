//! dnsfold - DNS blocklist merger
//!
//! Fetches public domain blocklists and writes one collapsed Adblock list.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use dnsfold::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Update { dry_run, threshold } => {
            dnsfold::commands::update::run(dry_run, threshold, config).await
        }
        Commands::Sources => dnsfold::commands::sources::run(config).await,
        Commands::Config => dnsfold::commands::show_config::run(config).await,
        Commands::Version => {
            println!("dnsfold {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
