use crate::feed::Source;
use async_trait::async_trait;
use feed_rs::parser;
use futures::StreamExt;
use reqwest::redirect::Policy;
use std::time::Duration;
use thiserror::Error;

const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors from retrieving or parsing a single feed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// The fetch did not finish within the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Feed XML could not be parsed as RSS or Atom
    #[error("Parse error: {0}")]
    Parse(String),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// One entry as the feed delivered it, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntry {
    /// Empty when the entry has no link.
    pub link: String,
    pub title: String,
    /// Timestamp text as published; parsed later against known layouts.
    pub published: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
}

/// What a [`SourceClient`] returns for one source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceFeed {
    /// The feed's own title, used as the badge when the source has no name.
    pub title: Option<String>,
    pub entries: Vec<RawEntry>,
}

/// Turns a configured [`Source`] into raw entries.
///
/// Transport and wire format live entirely behind this trait so the
/// aggregator can be driven by an in-memory client in tests.
#[async_trait]
pub trait SourceClient: Send + Sync {
    async fn fetch(&self, source: &Source) -> Result<SourceFeed, FetchError>;
}

/// Create a custom redirect policy with loop detection and limited hops.
///
/// - Limits redirects to 3 hops maximum
/// - Detects redirect loops (same URL appearing twice in chain)
/// - Logs redirect chain for debugging
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        for prev in attempt.previous() {
            if prev.as_str() == url.as_str() {
                return attempt.error("Redirect loop detected");
            }
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

/// [`SourceClient`] over HTTP(S), parsing RSS and Atom with `feed-rs`.
///
/// No retries: a failed fetch simply fails this refresh pass and the next
/// scheduled pass tries again.
#[derive(Clone)]
pub struct HttpSourceClient {
    client: reqwest::Client,
}

impl HttpSourceClient {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .redirect(create_redirect_policy())
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .user_agent(concat!("feedmux/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client (tests point this at a mock server).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceClient for HttpSourceClient {
    async fn fetch(&self, source: &Source) -> Result<SourceFeed, FetchError> {
        let response = self.client.get(&source.url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        let bytes = read_limited_bytes(response, MAX_FEED_SIZE).await?;
        let feed = parse_feed(&bytes)?;

        tracing::debug!(
            source = %source.url,
            entries = feed.entries.len(),
            "Fetched feed"
        );
        Ok(feed)
    }
}

/// Parses RSS/Atom bytes into a [`SourceFeed`].
pub fn parse_feed(bytes: &[u8]) -> Result<SourceFeed, FetchError> {
    let feed = parser::parse(bytes).map_err(|e| FetchError::Parse(e.to_string()))?;

    let title = feed
        .title
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty());

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let link = entry
                .links
                .first()
                .map(|l| l.href.trim().to_string())
                .unwrap_or_default();
            let published = entry.published.or(entry.updated).map(|dt| dt.to_rfc3339());
            let image_url = entry
                .media
                .iter()
                .flat_map(|m| m.thumbnails.iter())
                .map(|t| t.image.uri.clone())
                .find(|uri| !uri.is_empty());

            RawEntry {
                link,
                title: entry.title.map(|t| t.content).unwrap_or_default(),
                published,
                summary: entry.summary.map(|s| s.content),
                content: entry.content.and_then(|c| c.body),
                image_url,
            }
        })
        .collect();

    Ok(SourceFeed { title, entries })
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
