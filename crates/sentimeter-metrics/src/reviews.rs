use sentimeter_core::{ReplyRecord, Sentiment};

/// The `n` highest-confidence replies with the given sentiment.
#[must_use]
pub fn top_reviews(records: &[ReplyRecord], sentiment: Sentiment, n: usize) -> Vec<&ReplyRecord> {
    let mut matching: Vec<&ReplyRecord> = records
        .iter()
        .filter(|r| r.sentiment == sentiment)
        .collect();
    matching.sort_by(|a, b| b.score.total_cmp(&a.score));
    matching.truncate(n);
    matching
}

/// Texts of the `n` most recent negative replies, newest first.
#[must_use]
pub fn recent_negative_texts(records: &[ReplyRecord], n: usize) -> Vec<String> {
    let mut negatives: Vec<&ReplyRecord> = records
        .iter()
        .filter(|r| r.sentiment == Sentiment::Negative)
        .collect();
    negatives.sort_by(|a, b| b.at.cmp(&a.at));
    negatives
        .into_iter()
        .take(n)
        .map(|r| r.review.clone())
        .collect()
}
