use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::Duration;

// ============================================================================
// Source
// ============================================================================

/// One configured feed endpoint plus its badge attributes.
///
/// Owned by the configuration and never mutated after loading. Items carry
/// their own copy, so a refresh can resolve an empty `name` to the feed's
/// title without touching the configured record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Badge text. Empty means "use the feed's own title".
    #[serde(default)]
    pub name: String,
    pub url: String,
    /// Badge foreground, `#rrggbb`.
    #[serde(default)]
    pub fg: String,
    /// Badge background, `#rrggbb`.
    #[serde(default)]
    pub bg: String,
    /// Items older than this are dropped. 0 = unbounded.
    #[serde(default)]
    pub max_age_minutes: u64,
}

impl Source {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            fg: String::new(),
            bg: String::new(),
            max_age_minutes: 0,
        }
    }

    pub fn with_colors(mut self, fg: impl Into<String>, bg: impl Into<String>) -> Self {
        self.fg = fg.into();
        self.bg = bg.into();
        self
    }

    pub fn with_max_age_minutes(mut self, minutes: u64) -> Self {
        self.max_age_minutes = minutes;
        self
    }

    /// Maximum item age, or `None` when unbounded.
    pub fn max_age(&self) -> Option<Duration> {
        (self.max_age_minutes > 0).then(|| Duration::from_secs(self.max_age_minutes * 60))
    }
}

// ============================================================================
// Item
// ============================================================================

/// Stable identity of an [`Item`]: lower-case hex SHA-256 of its URL.
///
/// Two items with the same URL always share an ID, across refreshes and
/// across processes, which is what lets the list keep its selection when a
/// fresh snapshot replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    pub fn from_url(url: &str) -> Self {
        let hash = Sha256::digest(url.as_bytes());
        Self(format!("{:x}", hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One aggregated, normalized feed entry.
///
/// Immutable after construction; a refresh builds a whole new collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub source: Source,
    pub title: String,
    /// Extracted summary, or the URL when no usable summary exists.
    pub description: String,
    pub url: String,
    pub image_url: Option<String>,
    /// `None` when the entry's timestamp could not be parsed.
    pub published: Option<DateTime<Utc>>,
}

impl Item {
    /// Case-insensitive substring match against title, description, source
    /// name and URL. `needle` must already be lower-case.
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        [
            self.title.as_str(),
            self.description.as_str(),
            self.source.name.as_str(),
            self.url.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}
