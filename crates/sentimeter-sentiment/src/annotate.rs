use futures::{stream, StreamExt, TryStreamExt};
use sentimeter_core::{RawReply, ReplyRecord};

use crate::categorizer::Categorizer;
use crate::classifier::Classifier;
use crate::error::SentimentError;

/// Classify and categorize every reply, at most `concurrency` at a time.
///
/// Output order matches input order. The first reply that still fails after
/// its retries aborts the whole batch, so callers never see a partially
/// annotated set.
///
/// # Errors
///
/// The first classifier or categorizer error encountered.
pub async fn annotate_replies(
    replies: Vec<RawReply>,
    classifier: &Classifier,
    categorizer: &Categorizer,
    concurrency: usize,
) -> Result<Vec<ReplyRecord>, SentimentError> {
    let total = replies.len();
    tracing::info!(total, concurrency, "annotating replies");

    let records: Vec<ReplyRecord> = stream::iter(replies)
        .map(|reply| async move {
            let prediction = classifier.classify(&reply.review).await?;
            let category = categorizer.categorize(&reply.review).await?;
            Ok::<_, SentimentError>(ReplyRecord::annotated(
                reply,
                prediction.sentiment,
                prediction.score,
                category,
            ))
        })
        .buffered(concurrency.max(1))
        .inspect_err(|e| tracing::error!(error = %e, "annotation failed; aborting batch"))
        .try_collect()
        .await?;

    tracing::info!(annotated = records.len(), "annotation complete");
    Ok(records)
}
