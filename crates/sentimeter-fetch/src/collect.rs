use sentimeter_core::{RawReply, TrackedCompanies};

use crate::client::SearchClient;
use crate::error::FetchError;
use crate::normalize::normalize_sources;
use crate::window::SearchWindow;

/// Fetch replies for every tracked handle, one handle at a time, and fold
/// alias handles into canonical company names.
///
/// A handle whose pagination failed contributes whatever it fetched before
/// the failure. An empty result is valid as long as some handle completed.
///
/// # Errors
///
/// [`FetchError::AllHandlesFailed`] when every handle ended in an error and
/// nothing was collected.
pub async fn fetch_all_replies(
    client: &SearchClient,
    companies: &TrackedCompanies,
    window: &SearchWindow,
) -> Result<Vec<RawReply>, FetchError> {
    let handles = companies.handles();
    let mut all = Vec::new();
    let mut failed = 0;
    let mut last_error = None;

    for &handle in &handles {
        let outcome = client.fetch_replies(handle, window).await;
        if let Some(e) = outcome.error {
            tracing::warn!(
                handle,
                kept = outcome.replies.len(),
                error = %e,
                "handle fetch incomplete"
            );
            failed += 1;
            last_error = Some(e);
        } else {
            tracing::info!(
                handle,
                replies = outcome.replies.len(),
                pages = outcome.pages,
                "fetched replies"
            );
        }
        all.extend(outcome.replies);
    }

    if all.is_empty() && failed == handles.len() {
        if let Some(last) = last_error {
            return Err(FetchError::AllHandlesFailed {
                handles: failed,
                last: Box::new(last),
            });
        }
    }

    normalize_sources(companies, &mut all);
    Ok(all)
}
