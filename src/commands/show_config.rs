//! Config command implementation.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;

/// Print the effective configuration as YAML
pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load_or_default(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    print!("{}", config.to_yaml()?);
    Ok(())
}
