use crate::feed::client::{FetchError, RawEntry, SourceClient, SourceFeed};
use crate::feed::description;
use crate::feed::timestamp::parse_published;
use crate::feed::{Item, ItemId, Source};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default bound on a single source's fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// One source's fetch failed.
#[derive(Debug, Error)]
#[error("{name}: {error}")]
pub struct SourceFetchError {
    /// Configured name, or the URL when the source has no name.
    pub name: String,
    pub url: String,
    #[source]
    pub error: FetchError,
}

/// A whole aggregation pass failed; no partial result exists.
#[derive(Debug, Error)]
#[error("{}", summarize(.failures))]
pub struct AggregationError {
    pub failures: Vec<SourceFetchError>,
}

fn summarize(failures: &[SourceFetchError]) -> String {
    match failures {
        [] => "Aggregation failed".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}

/// Fetches every configured source concurrently and merges the results into
/// one list, most recent first.
///
/// Reads are all-or-nothing: if any source fails, the pass fails and the
/// caller keeps whatever it was showing before. A half-populated list would
/// look complete to the user.
#[derive(Clone)]
pub struct Aggregator {
    client: Arc<dyn SourceClient>,
    fetch_timeout: Duration,
}

impl Aggregator {
    pub fn new(client: Arc<dyn SourceClient>) -> Self {
        Self {
            client,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Runs one aggregation pass over `sources`.
    ///
    /// All fetches run concurrently and all of them finish (or fail) before
    /// this returns. Each fetch produces its own result; the only shared step
    /// is the final merge.
    pub async fn read(&self, sources: &[Source]) -> Result<Vec<Item>, AggregationError> {
        if sources.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        // Owned sources: a closure over `&Source` makes this future non-Send
        let results: Vec<Result<Vec<Item>, SourceFetchError>> =
            stream::iter(sources.iter().cloned())
                .map(|source| async move {
                    self.fetch_source(&source, now).await.map_err(|error| {
                        tracing::warn!(
                            source = %source.url,
                            error = %error,
                            "Source fetch failed"
                        );
                        SourceFetchError {
                            name: display_name(&source),
                            url: source.url.clone(),
                            error,
                        }
                    })
                })
                .buffer_unordered(sources.len())
                .collect()
                .await;

        let mut all = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(items) => all.extend(items),
                Err(e) => failures.push(e),
            }
        }

        if !failures.is_empty() {
            return Err(AggregationError { failures });
        }

        sort_newest_first(&mut all);
        tracing::info!(
            sources = sources.len(),
            items = all.len(),
            "Aggregation pass complete"
        );
        Ok(all)
    }

    async fn fetch_source(
        &self,
        source: &Source,
        now: DateTime<Utc>,
    ) -> Result<Vec<Item>, FetchError> {
        let feed = tokio::time::timeout(self.fetch_timeout, self.client.fetch(source))
            .await
            .map_err(|_| FetchError::Timeout)??;
        Ok(normalize(source, feed, now))
    }
}

fn display_name(source: &Source) -> String {
    if source.name.is_empty() {
        source.url.clone()
    } else {
        source.name.clone()
    }
}

/// Most recent first; undated items (`None`) sink to the end.
pub fn sort_newest_first(items: &mut [Item]) {
    items.sort_unstable_by(|a, b| b.published.cmp(&a.published));
}

/// Turns one source's raw entries into [`Item`]s.
///
/// Entries without a link are skipped. When the source has a maximum age,
/// entries older than it (or without a parseable date) are dropped. An empty
/// configured name is replaced with the feed's own title on the items' copy
/// of the source; the configured record is left alone.
pub fn normalize(source: &Source, feed: SourceFeed, now: DateTime<Utc>) -> Vec<Item> {
    let mut badge = source.clone();
    if badge.name.is_empty() {
        if let Some(title) = feed.title {
            badge.name = title;
        }
    }

    let max_age = source
        .max_age()
        .and_then(|age| chrono::Duration::from_std(age).ok());

    let total = feed.entries.len();
    let items: Vec<Item> = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            if entry.link.is_empty() {
                return None;
            }
            let published = entry.published.as_deref().and_then(parse_published);
            if let Some(max_age) = max_age {
                match published {
                    Some(date) if now.signed_duration_since(date) <= max_age => {}
                    _ => return None,
                }
            }
            Some(build_item(&badge, entry, published))
        })
        .collect();

    if items.len() < total {
        tracing::debug!(
            source = %source.url,
            kept = items.len(),
            dropped = total - items.len(),
            "Entries filtered during normalization"
        );
    }
    items
}

fn build_item(source: &Source, entry: RawEntry, published: Option<DateTime<Utc>>) -> Item {
    let description = description::extract(
        [entry.summary.as_deref(), entry.content.as_deref()]
            .into_iter()
            .flatten(),
    )
    .unwrap_or_else(|| entry.link.clone());

    Item {
        id: ItemId::from_url(&entry.link),
        source: source.clone(),
        title: entry.title,
        description,
        url: entry.link,
        image_url: entry.image_url.filter(|u| !u.is_empty()),
        published,
    }
}
