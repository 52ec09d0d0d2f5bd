//! Rendering and writing of the generated list and the optimization report.

use anyhow::{Context, Result};
use chrono::Local;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::config::HeaderConfig;
use crate::optimizer::OptimizationSuggestion;

/// `Last modified` format in the list header
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time formatted for the list header
pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Canonical blocking rule for a domain
pub fn format_rule(domain: &str) -> String {
    format!("||{}^", domain)
}

/// Render the Adblock Plus list: fixed header, then sorted rules.
pub fn render_blocklist(
    domains: &HashSet<String>,
    header: &HeaderConfig,
    timestamp: &str,
) -> String {
    let mut rules: Vec<String> = domains.iter().map(|d| format_rule(d)).collect();
    rules.sort();

    let mut out = format!(
        "[Adblock Plus]\n\
         ! Title: {}\n\
         ! Description: {}\n\
         ! Homepage: {}\n\
         ! Last modified: {}\n\
         ! Number of entries: {}\n",
        header.title,
        header.description,
        header.homepage,
        timestamp,
        rules.len()
    );
    out.push_str(&rules.join("\n"));
    out.push('\n');
    out
}

/// Render the optimization report, one suggestion per line, in the given order.
pub fn render_report(suggestions: &[OptimizationSuggestion]) -> String {
    suggestions
        .iter()
        .map(|s| format!("{}  (removed {} subdomains)\n", s.domain, s.removed))
        .collect()
}

/// Write `content` atomically
///
/// Uses tempfile + rename pattern so readers never see a half-written list.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut temp_file = NamedTempFile::new_in(parent_dir)
        .with_context(|| format!("Failed to create temporary file in {:?}", parent_dir))?;

    temp_file.write_all(content.as_bytes())?;
    temp_file.as_file().sync_all()?;

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to write {:?}", path))?;

    Ok(())
}
