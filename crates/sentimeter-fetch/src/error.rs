use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by search API (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from search API: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("pagination limit reached for @{handle}: exceeded {max_pages} pages")]
    PaginationLimit { handle: String, max_pages: usize },

    #[error("every handle failed ({handles} tried); last error: {last}")]
    AllHandlesFailed {
        handles: usize,
        #[source]
        last: Box<FetchError>,
    },

    #[error("invalid search base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
