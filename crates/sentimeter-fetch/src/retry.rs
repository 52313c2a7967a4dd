//! Exponential back-off with jitter for search API requests.
//!
//! Only transient failures are retried: network timeouts and connection
//! errors, HTTP 429, and HTTP 5xx. Anything else (auth failures, malformed
//! bodies) is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

/// Upper bound on a single back-off sleep.
const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors worth another attempt after a delay.
pub(crate) fn is_retriable(err: &FetchError) -> bool {
    match err {
        FetchError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        FetchError::RateLimited { .. } => true,
        FetchError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        FetchError::Deserialize { .. }
        | FetchError::PaginationLimit { .. }
        | FetchError::AllHandlesFailed { .. }
        | FetchError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation`, retrying up to `max_retries` extra times on transient errors.
///
/// The n-th retry sleeps `backoff_base_ms * 2^(n-1)` milliseconds, capped at
/// 60 s and scaled by a random factor in `[0.75, 1.25)`. A 429 that carries a
/// `Retry-After` longer than the computed delay waits for the server's value.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let mut delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                if let FetchError::RateLimited { retry_after_secs } = &err {
                    if backoff_base_ms > 0 {
                        delay_ms = delay_ms
                            .max((*retry_after_secs).saturating_mul(1_000))
                            .min(MAX_DELAY_MS);
                    }
                }
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "search API transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn deserialize_err() -> FetchError {
        let source = serde_json::from_str::<()>("invalid").unwrap_err();
        FetchError::Deserialize {
            context: "test".to_owned(),
            source,
        }
    }

    #[test]
    fn rate_limited_is_retriable() {
        assert!(is_retriable(&FetchError::RateLimited {
            retry_after_secs: 1
        }));
    }

    #[test]
    fn server_errors_are_retriable() {
        assert!(is_retriable(&FetchError::UnexpectedStatus {
            status: 503,
            body: String::new(),
        }));
    }

    #[test]
    fn client_errors_are_not_retriable() {
        assert!(!is_retriable(&FetchError::UnexpectedStatus {
            status: 403,
            body: "forbidden".to_owned(),
        }));
        assert!(!is_retriable(&deserialize_err()));
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(FetchError::UnexpectedStatus {
                        status: 502,
                        body: String::new(),
                    })
                } else {
                    Ok(7u32)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(FetchError::RateLimited {
                    retry_after_secs: 30,
                })
            }
        })
        .await;
        assert!(matches!(result, Err(FetchError::RateLimited { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_forbidden() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(FetchError::UnexpectedStatus {
                    status: 403,
                    body: String::new(),
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
