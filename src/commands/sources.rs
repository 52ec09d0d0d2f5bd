//! Sources command implementation.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::utils::truncate;

/// List configured upstream sources
pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load_or_default(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    print!("{}", render_sources(&config));
    Ok(())
}

fn render_sources(config: &Config) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        " {:<24} {:<8} {:<8} URL\n",
        "NAME", "KIND", "ENABLED"
    ));
    for source in &config.sources {
        out.push_str(&format!(
            " {:<24} {:<8} {:<8} {}\n",
            truncate(&source.name, 24),
            source.kind.to_string(),
            if source.enabled { "yes" } else { "no" },
            source.url
        ));
    }
    out.push_str(&format!(
        "\n {} of {} sources enabled\n",
        config.enabled_sources().len(),
        config.sources.len()
    ));
    out
}
