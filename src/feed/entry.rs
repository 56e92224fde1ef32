use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A single feed item as returned by the proxy. Immutable once fetched.
///
/// Field names follow the proxy's JSON payload (camelCase). Only `link`
/// is required, since it doubles as the cache identity; everything else
/// is best-effort metadata the proxy may or may not populate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    /// Unique link for the entry; used as the cache key.
    pub link: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub author: Option<String>,

    /// Publication date as reported by the proxy (RFC 2822).
    #[serde(default)]
    pub published_date: Option<String>,

    /// Plain-text excerpt of the entry body.
    #[serde(default)]
    pub content_snippet: Option<String>,

    /// Full HTML body, when the proxy includes it.
    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub categories: Vec<String>,
}

impl FeedEntry {
    /// Parsed publication date, if the proxy supplied a valid one.
    pub fn published_at(&self) -> Option<DateTime<FixedOffset>> {
        self.published_date
            .as_deref()
            .and_then(|date| DateTime::parse_from_rfc2822(date).ok())
    }
}
