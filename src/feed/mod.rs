//! Feed retrieval and aggregation.
//!
//! - [`client`] - the [`SourceClient`] seam and its HTTP/`feed-rs` implementation
//! - [`aggregator`] - concurrent fan-out over every source, merged newest first
//! - [`description`] - plain-text summaries from feed HTML
//! - [`timestamp`] - timestamp parsing against the layouts feeds actually use
//!
//! ```ignore
//! let client = Arc::new(HttpSourceClient::new()?);
//! let items = Aggregator::new(client).read(&config.sources()).await?;
//! ```

pub mod aggregator;
pub mod client;
pub mod description;
pub mod timestamp;
mod types;

pub use aggregator::{AggregationError, Aggregator, SourceFetchError};
pub use client::{FetchError, HttpSourceClient, RawEntry, SourceClient, SourceFeed};
pub use types::{Item, ItemId, Source};
