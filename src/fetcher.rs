//! HTTP fetcher for downloading upstream lists.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[cfg(test)]
use mockall::automock;

use crate::config::{FetchConfig, Source, SourceKind};
use crate::error::FetchError;
use crate::utils::{format_bytes, format_count};

/// A single download attempt.
///
/// Retrying lives in [`fetch_with_retry`] so it can be exercised against a
/// mock in tests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ListFetcher: Send + Sync {
    /// Download `url` and return its body.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// HTTP client for fetching lists
pub struct Fetcher {
    client: Client,
    max_list_size: usize,
}

impl Fetcher {
    /// Create a new fetcher from the retrieval settings
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .read_timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("dnsfold/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            max_list_size: config.max_list_size,
        })
    }
}

// Note: Default is intentionally not implemented for Fetcher
// because new() can fail and we want explicit error handling.

#[async_trait]
impl ListFetcher for Fetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        if let Some(content_length) = response.content_length() {
            if content_length as usize > self.max_list_size {
                return Err(FetchError::TooLarge {
                    size: content_length as usize,
                    max: self.max_list_size,
                });
            }
        }

        let body = response.text().await?;

        // Content-Length may be missing or wrong
        if body.len() > self.max_list_size {
            return Err(FetchError::TooLarge {
                size: body.len(),
                max: self.max_list_size,
            });
        }

        debug!("Downloaded {} from {}", format_bytes(body.len() as u64), url);
        Ok(body)
    }
}

/// How often and how patiently a source is retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl From<&FetchConfig> for RetryPolicy {
    fn from(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_retries,
            base_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Fetch `url`, retrying with exponential backoff.
///
/// Returns the error of the last attempt once all attempts fail.
pub async fn fetch_with_retry(
    fetcher: &dyn ListFetcher,
    url: &str,
    policy: RetryPolicy,
) -> Result<String, FetchError> {
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        if attempt > 0 && !policy.base_delay.is_zero() {
            let delay = policy.base_delay.saturating_mul(1 << (attempt - 1).min(16));
            debug!("Retry {} after {:?} for {}", attempt, delay, url);
            tokio::time::sleep(delay).await;
        }

        match fetcher.fetch(url).await {
            Ok(body) => return Ok(body),
            Err(e) if attempt + 1 < attempts => {
                warn!(
                    "Failed to fetch {} (attempt {}/{}): {}",
                    url,
                    attempt + 1,
                    attempts,
                    e
                );
            }
            Err(e) => return Err(e),
        }
        attempt += 1;
    }
}

/// Raw lines downloaded from one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLines {
    pub name: String,
    pub kind: SourceKind,
    pub lines: Vec<String>,
    /// False when every attempt failed; `lines` is then empty
    pub fetched: bool,
}

impl SourceLines {
    pub fn new(name: &str, kind: SourceKind, lines: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            lines,
            fetched: true,
        }
    }

    fn failed(source: &Source) -> Self {
        Self {
            name: source.name.clone(),
            kind: source.kind,
            lines: Vec::new(),
            fetched: false,
        }
    }
}

/// Fetch every source, keeping configured order.
///
/// A source that cannot be downloaded contributes no lines; the others are
/// still returned.
pub async fn fetch_sources(
    fetcher: &dyn ListFetcher,
    sources: &[&Source],
    config: &FetchConfig,
) -> Vec<SourceLines> {
    let policy = RetryPolicy::from(config);

    stream::iter(sources.iter().map(|source| fetch_source(fetcher, source, policy)))
        .buffered(config.max_concurrent_fetches.max(1))
        .collect()
        .await
}

async fn fetch_source(
    fetcher: &dyn ListFetcher,
    source: &Source,
    policy: RetryPolicy,
) -> SourceLines {
    match fetch_with_retry(fetcher, &source.url, policy).await {
        Ok(body) => {
            let lines: Vec<String> = split_lines(&body).into_iter().map(str::to_string).collect();
            let unique = lines.iter().collect::<HashSet<_>>().len();
            info!(
                "Fetched {} - {} lines ({} unique)",
                source.name,
                format_count(lines.len()),
                format_count(unique)
            );
            SourceLines::new(&source.name, source.kind, lines)
        }
        Err(e) => {
            error!("Failed to fetch {} ({}): {}", source.name, source.url, e);
            SourceLines::failed(source)
        }
    }
}

/// Split a downloaded body into lines.
///
/// Breaks on `\n`, `\r\n`, a lone `\r` and the other Unicode line
/// boundaries (`\x0b`, `\x0c`, `\x1c`-`\x1e`, `\u{85}`, `\u{2028}`,
/// `\u{2029}`). A trailing break does not produce an empty last line.
pub fn split_lines(body: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = body.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !is_line_break(ch) {
            continue;
        }
        lines.push(&body[start..idx]);
        start = idx + ch.len_utf8();
        if ch == '\r' {
            if let Some(&(next, '\n')) = chars.peek() {
                chars.next();
                start = next + 1;
            }
        }
    }
    if start < body.len() {
        lines.push(&body[start..]);
    }
    lines
}

fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r'
            | '\x0b'
            | '\x0c'
            | '\x1c'
            | '\x1d'
            | '\x1e'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::ZERO,
        }
    }

    fn status_error() -> FetchError {
        FetchError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE)
    }

    #[tokio::test]
    async fn test_retry_succeeds_first_attempt() {
        let mut mock = MockListFetcher::new();
        mock.expect_fetch()
            .times(1)
            .returning(|_| Ok("||a.example^\n".to_string()));

        let body = fetch_with_retry(&mock, "https://lists.example/a.txt", policy(3))
            .await
            .unwrap();
        assert_eq!(body, "||a.example^\n");
    }

    #[tokio::test]
    async fn test_retry_recovers_after_failures() {
        let mut mock = MockListFetcher::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_fetch()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Err(status_error()));
        mock.expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("ok".to_string()));

        let body = fetch_with_retry(&mock, "https://lists.example/a.txt", policy(3))
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let mut mock = MockListFetcher::new();
        mock.expect_fetch()
            .times(3)
            .returning(|_| Err(status_error()));

        let result = fetch_with_retry(&mock, "https://lists.example/a.txt", policy(3)).await;
        assert!(matches!(result, Err(FetchError::Status(_))));
    }

    #[tokio::test]
    async fn test_retry_zero_attempts_still_tries_once() {
        let mut mock = MockListFetcher::new();
        mock.expect_fetch()
            .times(1)
            .returning(|_| Err(status_error()));

        assert!(fetch_with_retry(&mock, "https://lists.example/a.txt", policy(0))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_fetch_sources_keeps_order_and_degrades() {
        let mut mock = MockListFetcher::new();
        mock.expect_fetch()
            .withf(|url| url == "https://lists.example/rules.txt")
            .returning(|_| Ok("||a.example^\n||b.example^\n".to_string()));
        mock.expect_fetch()
            .withf(|url| url == "https://lists.example/broken.txt")
            .times(3)
            .returning(|_| Err(status_error()));
        mock.expect_fetch()
            .withf(|url| url == "https://lists.example/domains.txt")
            .returning(|_| Ok("evil.example\n".to_string()));

        let sources = [
            Source::new("rules", "https://lists.example/rules.txt", SourceKind::Rules),
            Source::new("broken", "https://lists.example/broken.txt", SourceKind::Rules),
            Source::new("domains", "https://lists.example/domains.txt", SourceKind::Domains),
        ];
        let refs: Vec<&Source> = sources.iter().collect();

        let results = fetch_sources(&mock, &refs, &FetchConfig::default()).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].name, "rules");
        assert_eq!(results[0].lines, vec!["||a.example^", "||b.example^"]);
        assert!(results[0].fetched);
        assert_eq!(results[1].name, "broken");
        assert!(results[1].lines.is_empty());
        assert!(!results[1].fetched);
        assert_eq!(results[2].kind, SourceKind::Domains);
        assert_eq!(results[2].lines, vec!["evil.example"]);
    }

    #[test]
    fn test_retry_policy_from_config() {
        let config = FetchConfig {
            max_retries: 5,
            retry_delay_ms: 250,
            ..FetchConfig::default()
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_split_lines_line_endings() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\nb\r\n"), vec!["a", "b"]);
        assert_eq!(split_lines("a\rb\r"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\rb"), vec!["a", "", "b"]);
        assert_eq!(
            split_lines("a\x0bb\x0cc\u{2028}d\u{85}e"),
            vec!["a", "b", "c", "d", "e"]
        );
    }

    #[test]
    fn test_split_lines_edges() {
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("\n"), vec![""]);
        assert_eq!(split_lines("no break"), vec!["no break"]);
        assert_eq!(split_lines("\n\nx"), vec!["", "", "x"]);
    }

    #[tokio::test]
    async fn test_fetch_sources_cr_only_body() {
        let mut mock = MockListFetcher::new();
        mock.expect_fetch()
            .returning(|_| Ok("! Title: mac list\r||a.example^\r||b.example^\r".to_string()));

        let sources = [Source::new("cr", "https://lists.example/cr.txt", SourceKind::Rules)];
        let refs: Vec<&Source> = sources.iter().collect();

        let results = fetch_sources(&mock, &refs, &FetchConfig::default()).await;
        assert_eq!(
            results[0].lines,
            vec!["! Title: mac list", "||a.example^", "||b.example^"]
        );
    }

    /// Serve `chunks` over plain HTTP, pausing `pause` before each one
    async fn serve_slowly(chunks: Vec<&'static str>, pause: Duration) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let body_len: usize = chunks.iter().map(|c| c.len()).sum();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body_len
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            for chunk in chunks {
                tokio::time::sleep(pause).await;
                // The client may already have given up
                if socket.write_all(chunk.as_bytes()).await.is_err() {
                    return;
                }
                let _ = socket.flush().await;
            }
        });

        format!("http://{}/list.txt", addr)
    }

    #[tokio::test]
    async fn test_slow_body_within_read_timeout_is_kept() {
        // Whole download takes ~2.4s, but no single read waits longer than 1s.
        let url = serve_slowly(
            vec!["||a.example^\n", "||b.example^\n", "||c.example^\n", "||d.example^\n"],
            Duration::from_millis(600),
        )
        .await;
        let config = FetchConfig {
            timeout_secs: 1,
            ..FetchConfig::default()
        };

        let fetcher = Fetcher::new(&config).unwrap();
        let body = fetcher.fetch(&url).await.unwrap();
        assert_eq!(split_lines(&body).len(), 4);
    }

    #[tokio::test]
    async fn test_stalled_body_times_out() {
        let url = serve_slowly(vec!["||a.example^\n"], Duration::from_millis(2500)).await;
        let config = FetchConfig {
            timeout_secs: 1,
            ..FetchConfig::default()
        };

        let fetcher = Fetcher::new(&config).unwrap();
        assert!(matches!(fetcher.fetch(&url).await, Err(FetchError::Transport(_))));
    }

    #[test]
    fn test_fetcher_new() {
        assert!(Fetcher::new(&FetchConfig::default()).is_ok());
    }
}
