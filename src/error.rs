//! Error types for dnsfold.

use thiserror::Error;

/// Failure of a single attempt to download a source list.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Response too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: usize, max: usize },
}
