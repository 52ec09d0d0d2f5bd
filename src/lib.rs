//! # dnsfold - DNS Blocklist Merger
//!
//! Fetches public domain blocklists and folds them into a single Adblock
//! Plus list: deduplicated, with subdomains of listed domains removed and
//! heavily listed registrable domains promoted to one rule.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        dnsfold                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: update, sources, config, version           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! │    └── Sources, threshold, list and output paths            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Fetcher (reqwest + rustls)                                 │
//! │    └── Retry with backoff, failed sources yield no lines    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Pipeline                                                   │
//! │    ├── parser     ||domain^ rules, bare-domain wrapping     │
//! │    ├── filter     allow-list and its subdomains             │
//! │    ├── collapse   drop subdomains of listed domains         │
//! │    └── optimizer  promote registrable domains               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Output                                                     │
//! │    └── Adblock list + optimization report, atomic writes    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```
//! use dnsfold::config::SourceKind;
//! use dnsfold::fetcher::SourceLines;
//! use dnsfold::pipeline::{build_blocklist, FilterLists};
//!
//! let sources = vec![
//!     SourceLines::new("rules", SourceKind::Rules, vec![
//!         "||x.example.com^".to_string(),
//!         "! comment".to_string(),
//!     ]),
//!     SourceLines::new("bare", SourceKind::Domains, vec!["example.com".to_string()]),
//! ];
//! let result = build_blocklist(&sources, &FilterLists::default(), 100);
//! assert_eq!(result.domains.len(), 1);
//! assert!(result.domains.contains("example.com"));
//! ```
//!
//! ## Modules
//!
//! - [`cli`] - Command-line interface definitions
//! - [`collapse`] - Removal of domains covered by a listed parent
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration parsing and validation
//! - [`error`] - Retrieval error types
//! - [`fetcher`] - HTTP client for downloading lists
//! - [`filter`] - Allow-list filtering
//! - [`optimizer`] - Registrable domain promotion
//! - [`output`] - List and report rendering, atomic writes
//! - [`parser`] - Rule line parsing
//! - [`pipeline`] - The parse/filter/collapse/optimize chain
//! - [`utils`] - Formatting helpers

pub mod cli;
pub mod collapse;
pub mod commands;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod optimizer;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::Config;
