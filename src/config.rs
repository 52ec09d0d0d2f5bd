//! Configuration management for dnsfold.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::optimizer::DEFAULT_THRESHOLD;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Subdomain count that must be exceeded before a registrable domain is promoted
    pub threshold: usize,

    /// Domains (and their subdomains) never written to the output
    pub exclude_list_file: PathBuf,

    /// Registrable domains the optimizer must never promote
    pub no_optimization_list_file: PathBuf,

    /// Generated Adblock list
    pub output_file: PathBuf,

    /// Human-readable log of promoted domains
    pub optimization_log_file: PathBuf,

    /// Header fields of the generated list
    pub header: HeaderConfig,

    /// HTTP retrieval settings
    pub fetch: FetchConfig,

    /// Upstream lists
    pub sources: Vec<Source>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            exclude_list_file: PathBuf::from("Allowed_List.txt"),
            no_optimization_list_file: PathBuf::from("No_Optimization_List.txt"),
            output_file: PathBuf::from("Full_DNS_Block.txt"),
            optimization_log_file: PathBuf::from("Optimization_suggestion.txt"),
            header: HeaderConfig::default(),
            fetch: FetchConfig::default(),
            sources: default_sources(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` if given, otherwise use the built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.fetch.max_retries == 0 {
            anyhow::bail!("fetch.max_retries must be at least 1");
        }

        if self.fetch.timeout_secs == 0 {
            anyhow::bail!("fetch.timeout_secs must be at least 1");
        }

        if self.fetch.max_concurrent_fetches == 0 {
            anyhow::bail!("fetch.max_concurrent_fetches must be at least 1");
        }

        if self.output_file.as_os_str().is_empty()
            || self.optimization_log_file.as_os_str().is_empty()
        {
            anyhow::bail!("output_file and optimization_log_file must not be empty");
        }

        let mut names = HashSet::new();
        for source in &self.sources {
            if !names.insert(source.name.as_str()) {
                anyhow::bail!("Duplicate source name '{}'", source.name);
            }
            if source.enabled
                && !(source.url.starts_with("https://") || source.url.starts_with("http://"))
            {
                anyhow::bail!(
                    "Source '{}' URL must use http or https: {}",
                    source.name,
                    source.url
                );
            }
        }

        Ok(())
    }

    /// Enabled sources, in configured order
    pub fn enabled_sources(&self) -> Vec<&Source> {
        self.sources.iter().filter(|s| s.enabled).collect()
    }

    /// Serialize the configuration as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }
}

/// Header fields written at the top of the generated list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    pub title: String,
    pub description: String,
    pub homepage: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            title: "Full_DNS_Block".to_string(),
            description: "Linked lists to reduce size".to_string(),
            homepage: "https://github.com/Seple/Full_DNS_Block".to_string(),
        }
    }
}

/// HTTP retrieval settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Attempts per source, including the first one
    pub max_retries: u32,
    /// Base delay between attempts, doubled after each failure (0 = retry immediately)
    pub retry_delay_ms: u64,
    /// Maximum body size per source
    pub max_list_size: usize,
    /// Requests in flight at once
    pub max_concurrent_fetches: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            max_retries: 3,
            retry_delay_ms: 0,
            max_list_size: 64 * 1024 * 1024,
            max_concurrent_fetches: 4,
        }
    }
}

/// Format of an upstream list
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Adblock-style `||domain^` rules
    #[default]
    Rules,
    /// One bare domain per line
    Domains,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Rules => f.write_str("rules"),
            SourceKind::Domains => f.write_str("domains"),
        }
    }
}

/// An upstream list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub kind: SourceKind,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Source {
    pub fn new(name: &str, url: &str, kind: SourceKind) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            kind,
            enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Read a one-entry-per-line file into a set.
///
/// Entries are trimmed and blank lines skipped. A missing file yields an
/// empty set and a warning.
pub fn load_set_from_file(path: &Path) -> Result<HashSet<String>> {
    if !path.exists() {
        warn!("{} does not exist, using an empty list", path.display());
        return Ok(HashSet::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read list file: {:?}", path))?;
    Ok(parse_set(&content))
}

fn parse_set(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn default_sources() -> Vec<Source> {
    use SourceKind::{Domains, Rules};

    const HOSTLISTS: &str = "https://adguardteam.github.io/HostlistsRegistry/assets";
    const HAGEZI: &str = "https://raw.githubusercontent.com/hagezi/dns-blocklists/main/adblock";

    vec![
        Source::new("hagezi_pro", &format!("{HAGEZI}/pro.txt"), Rules),
        Source::new("polish_filters", &format!("{HOSTLISTS}/filter_14.txt"), Rules),
        Source::new("peter_lowe", &format!("{HOSTLISTS}/filter_3.txt"), Rules),
        Source::new("malicious_url", &format!("{HOSTLISTS}/filter_11.txt"), Rules),
        Source::new("phishing_url", &format!("{HOSTLISTS}/filter_30.txt"), Rules),
        Source::new("shadowwhisperer_malware", &format!("{HOSTLISTS}/filter_42.txt"), Rules),
        Source::new("dandelion_anti_malware", &format!("{HOSTLISTS}/filter_12.txt"), Rules),
        Source::new("hagezi_dyndns", &format!("{HOSTLISTS}/filter_54.txt"), Rules),
        Source::new("hagezi_bypass", &format!("{HOSTLISTS}/filter_52.txt"), Rules),
        Source::new("hagezi_hoster", &format!("{HAGEZI}/hoster.txt"), Rules),
        Source::new(
            "hagezi_spam_tlds",
            &format!("{HAGEZI}/spam-tlds-adblock-aggressive.txt"),
            Rules,
        ),
        Source::new("hagezi_tif_medium", &format!("{HAGEZI}/tif.medium.txt"), Rules),
        Source::new("phishing_army", &format!("{HOSTLISTS}/filter_18.txt"), Domains),
    ]
}
