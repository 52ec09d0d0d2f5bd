//! CLI command implementations.

pub mod show_config;
pub mod sources;
pub mod update;
