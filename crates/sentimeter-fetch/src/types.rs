use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Timestamp layout used by the search API, e.g. `Tue Mar 04 10:15:00 +0000 2025`.
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// One page of `advanced_search` results.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub tweets: Option<Vec<SearchTweet>>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl SearchResponse {
    /// Cursor for the following page. An empty string means there is none.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref().filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchTweet {
    #[serde(default)]
    pub text: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

/// Parse a `createdAt` value.
///
/// Accepts the API's native layout and, as a fallback, RFC 3339.
#[must_use]
pub fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_str(raw, CREATED_AT_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
