use std::time::Duration;

use reqwest::{Client, Url};
use sentimeter_core::RawReply;

use crate::error::FetchError;
use crate::retry::retry_with_backoff;
use crate::types::{parse_created_at, SearchResponse};
use crate::window::SearchWindow;

/// Default public endpoint of the search API.
pub const DEFAULT_BASE_URL: &str = "https://api.twitterapi.io";

/// Path of the advanced search endpoint, relative to the base URL.
const SEARCH_PATH: &str = "twitter/tweet/advanced_search";

/// Maximum number of pages fetched per handle.
/// Prevents infinite loops on cycling cursors.
const MAX_PAGES: usize = 200;

/// HTTP client for the advanced-search endpoint.
///
/// Every request carries the API key in the `X-API-Key` header. Transient
/// failures (network errors, 429, 5xx) are retried with exponential backoff up
/// to `max_retries` additional attempts; other non-success statuses fail fast.
pub struct SearchClient {
    client: Client,
    base_url: Url,
    api_key: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

/// Result of paging through one handle's replies.
///
/// Pagination stops at the first unrecoverable error, so `replies` may be a
/// prefix of the full result set. `error` records why it stopped early.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub replies: Vec<RawReply>,
    pub pages: usize,
    /// Items dropped because `createdAt` was missing or unparseable.
    pub skipped: usize,
    pub error: Option<FetchError>,
}

impl FetchOutcome {
    /// `true` when pagination ran until the API stopped returning a cursor.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

impl SearchClient {
    /// Creates a client against [`DEFAULT_BASE_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, FetchError> {
        Self::with_base_url(
            DEFAULT_BASE_URL,
            api_key,
            timeout_secs,
            user_agent,
            max_retries,
            backoff_base_ms,
        )
    }

    /// Creates a client against a custom base URL (a proxy or a test server).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidBaseUrl`] if `base_url` is not an absolute
    /// URL, or [`FetchError::Http`] if the `reqwest::Client` cannot be built.
    pub fn with_base_url(
        base_url: &str,
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, FetchError> {
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_owned(),
            max_retries,
            backoff_base_ms,
        })
    }

    /// Fetches one page of replies to `handle` inside `window`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::RateLimited`]: HTTP 429 after all retries.
    /// - [`FetchError::UnexpectedStatus`]: any other non-2xx status (5xx after retries).
    /// - [`FetchError::Http`]: network or TLS failure after all retries.
    /// - [`FetchError::Deserialize`]: the body does not match [`SearchResponse`].
    pub async fn fetch_page(
        &self,
        handle: &str,
        window: &SearchWindow,
        cursor: Option<&str>,
    ) -> Result<SearchResponse, FetchError> {
        let url = self.search_url(handle, window, cursor);

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url)
                    .header("X-API-Key", &self.api_key)
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(FetchError::RateLimited { retry_after_secs });
                }

                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(FetchError::UnexpectedStatus {
                        status: status.as_u16(),
                        body: truncate_body(&body),
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<SearchResponse>(&body).map_err(|e| {
                    FetchError::Deserialize {
                        context: format!("search page for @{handle}"),
                        source: e,
                    }
                })
            }
        })
        .await
    }

    /// Pages through every reply to `handle` inside `window`.
    ///
    /// Follows `next_cursor` until it is absent or empty. Each item becomes a
    /// [`RawReply`] with `source` set to `handle`. Items without a parseable
    /// `createdAt` are skipped with a warning. The first error stops
    /// pagination for this handle; replies gathered so far are kept.
    pub async fn fetch_replies(&self, handle: &str, window: &SearchWindow) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();
        let mut cursor: Option<String> = None;

        loop {
            if outcome.pages >= MAX_PAGES {
                outcome.error = Some(FetchError::PaginationLimit {
                    handle: handle.to_owned(),
                    max_pages: MAX_PAGES,
                });
                break;
            }

            let page = match self.fetch_page(handle, window, cursor.as_deref()).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(
                        handle,
                        pages = outcome.pages,
                        kept = outcome.replies.len(),
                        error = %e,
                        "search pagination aborted; keeping partial results"
                    );
                    outcome.error = Some(e);
                    break;
                }
            };
            outcome.pages += 1;

            let next = page.next_cursor().map(str::to_owned);
            for tweet in page.tweets.unwrap_or_default() {
                let Some(at) = tweet.created_at.as_deref().and_then(parse_created_at) else {
                    tracing::warn!(
                        handle,
                        created_at = tweet.created_at.as_deref().unwrap_or(""),
                        "dropping reply with missing or unparseable createdAt"
                    );
                    outcome.skipped += 1;
                    continue;
                };
                outcome.replies.push(RawReply {
                    review: tweet.text,
                    at,
                    source: handle.to_owned(),
                });
            }

            match next {
                Some(c) => cursor = Some(c),
                None => break,
            }
        }

        tracing::debug!(
            handle,
            pages = outcome.pages,
            replies = outcome.replies.len(),
            skipped = outcome.skipped,
            "finished paging replies"
        );
        outcome
    }

    /// Builds the search URL with query parameters URL-encoded.
    fn search_url(&self, handle: &str, window: &SearchWindow, cursor: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(SEARCH_PATH.split('/'));
        }
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("queryType", "Latest")
                .append_pair("query", &window.query_for(handle));
            if let Some(cursor) = cursor {
                pairs.append_pair("cursor", cursor);
            }
        }
        url
    }
}

fn parse_base_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|e| FetchError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(FetchError::InvalidBaseUrl {
            url: raw.to_owned(),
            reason: "URL cannot be used as a base".to_owned(),
        });
    }
    Ok(url)
}

/// Keeps error bodies short enough for a log line.
fn truncate_body(body: &str) -> String {
    const LIMIT: usize = 200;
    if body.chars().count() <= LIMIT {
        body.to_owned()
    } else {
        let head: String = body.chars().take(LIMIT).collect();
        format!("{head}…")
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
