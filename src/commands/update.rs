//! Update command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{error, info, warn};

use crate::config::{load_set_from_file, Config};
use crate::fetcher::{fetch_sources, Fetcher, ListFetcher};
use crate::filter::ExcludeSet;
use crate::output::{render_blocklist, render_report, timestamp_now, write_atomic};
use crate::pipeline::{build_blocklist, FilterLists, RunSummary};
use crate::utils::format_count_with_separator;

/// Run the update command
pub async fn run(
    dry_run: bool,
    threshold: Option<usize>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = Config::load_or_default(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    if let Some(threshold) = threshold {
        config.threshold = threshold;
    }

    let fetcher = Fetcher::new(&config.fetch)?;
    let summary = execute(&config, &fetcher, dry_run).await?;
    if dry_run {
        return Ok(());
    }

    println!();
    println!(
        "[OK] {} rules written to {} ({} promoted domains)",
        format_count_with_separator(summary.final_count),
        config.output_file.display(),
        summary.optimized
    );

    Ok(())
}

/// Load the filter lists named in the configuration
pub fn load_filter_lists(config: &Config) -> Result<FilterLists> {
    let exclude = load_set_from_file(&config.exclude_list_file)?;
    let no_optimize = load_set_from_file(&config.no_optimization_list_file)?;
    info!(
        "Allowlist: {} entries, no-optimization list: {} entries",
        exclude.len(),
        no_optimize.len()
    );
    Ok(FilterLists {
        exclude: ExcludeSet::new(exclude),
        no_optimize,
    })
}

/// Fetch, process and write one full run
pub async fn execute(
    config: &Config,
    fetcher: &dyn ListFetcher,
    dry_run: bool,
) -> Result<RunSummary> {
    let lists = load_filter_lists(config)?;

    let enabled = config.enabled_sources();
    if enabled.is_empty() {
        warn!("No sources enabled. Check your configuration.");
    }

    info!("Fetching {} sources...", enabled.len());
    let sources = fetch_sources(fetcher, &enabled, &config.fetch).await;

    let failed: Vec<&str> = sources
        .iter()
        .filter(|s| !s.fetched)
        .map(|s| s.name.as_str())
        .collect();
    if !failed.is_empty() {
        error!("{} sources could not be fetched: {}", failed.len(), failed.join(", "));
    }

    let result = build_blocklist(&sources, &lists, config.threshold);
    log_summary(&result.summary);

    if dry_run {
        info!("Dry run: not writing {}", config.output_file.display());
        return Ok(result.summary);
    }

    let list = render_blocklist(&result.domains, &config.header, &timestamp_now());
    write_atomic(&config.output_file, &list)?;
    info!("New list saved to {}", config.output_file.display());

    write_atomic(&config.optimization_log_file, &render_report(&result.suggestions))?;
    info!(
        "Optimization report saved to {}",
        config.optimization_log_file.display()
    );

    Ok(result.summary)
}

fn log_summary(summary: &RunSummary) {
    info!(
        "Summary: downloaded {} lines, {} unique domains, {} after allowlist, {} after collapsing, {} final rules",
        format_count_with_separator(summary.downloaded),
        format_count_with_separator(summary.unique),
        format_count_with_separator(summary.after_exclusion),
        format_count_with_separator(summary.after_collapse),
        format_count_with_separator(summary.final_count),
    );
    if summary.optimized > 0 {
        info!("Promoted {} registrable domains", summary.optimized);
    }
}
