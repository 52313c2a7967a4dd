//! Retry with exponential back-off and jitter for model calls.

use std::future::Future;
use std::time::Duration;

use crate::error::SentimentError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// Retriable: network timeouts and connection failures, HTTP 429, HTTP 5xx.
/// Everything else (auth failures, bad payloads, unknown labels) is final.
pub(crate) fn is_retriable(err: &SentimentError) -> bool {
    match err {
        SentimentError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        SentimentError::RateLimited { .. } => true,
        SentimentError::UnexpectedStatus { status, .. } => *status >= 500,
        SentimentError::Deserialize { .. }
        | SentimentError::Classifier(_)
        | SentimentError::EmptyCompletion { .. }
        | SentimentError::MissingApiKey(_)
        | SentimentError::NoInput => false,
    }
}

/// Back-off before retry number `attempt` (1-based).
///
/// `backoff_base_ms * 2^(attempt-1)`, capped at 60 s and scaled into
/// `[0.75, 1.25)` by `jitter` in `[0, 1)`. A 429 whose `Retry-After` exceeds
/// that waits for the server's value instead, still under the cap. A zero
/// base disables waiting entirely.
pub(crate) fn retry_delay_ms(
    err: &SentimentError,
    attempt: u32,
    backoff_base_ms: u64,
    jitter: f64,
) -> u64 {
    if backoff_base_ms == 0 {
        return 0;
    }
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let capped = computed.min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (capped as f64 * (jitter * 0.5 + 0.75)) as u64;
    match err {
        SentimentError::RateLimited {
            retry_after_secs, ..
        } => jittered
            .max(retry_after_secs.saturating_mul(1_000))
            .min(MAX_DELAY_MS),
        _ => jittered,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Delay before the n-th retry comes from [`retry_delay_ms`].
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, SentimentError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SentimentError>>,
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
                let delay_ms =
                    retry_delay_ms(&err, attempt, backoff_base_ms, rand::random::<f64>());
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "model call failed, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
