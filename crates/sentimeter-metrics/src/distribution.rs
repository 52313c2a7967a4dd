use sentimeter_core::{ReplyRecord, Sentiment};

use crate::percent;

/// Per-sentiment reply counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentCounts {
    #[must_use]
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a ReplyRecord>) -> Self {
        let mut counts = Self::default();
        for record in records {
            counts.add(record.sentiment);
        }
        counts
    }

    pub fn add(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }

    #[must_use]
    pub fn get(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }

    /// Share of `sentiment` in percent; `0.0` for an empty tally.
    #[must_use]
    pub fn percent(&self, sentiment: Sentiment) -> f64 {
        percent(self.get(sentiment), self.total())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentDistribution {
    pub counts: SentimentCounts,
    /// Mean classifier confidence, `0.0` for an empty set.
    pub mean_score: f64,
}

impl SentimentDistribution {
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.total()
    }

    #[must_use]
    pub fn percent(&self, sentiment: Sentiment) -> f64 {
        self.counts.percent(sentiment)
    }
}

#[must_use]
pub fn sentiment_distribution(records: &[ReplyRecord]) -> SentimentDistribution {
    let counts = SentimentCounts::tally(records);
    let scores: Vec<f64> = records.iter().map(|r| f64::from(r.score)).collect();
    SentimentDistribution {
        counts,
        mean_score: crate::mean(&scores),
    }
}

/// Positive-to-negative ratio used in comparisons: `positive / max(negative, 1)`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn pos_neg_ratio(positive: usize, negative: usize) -> f64 {
    positive as f64 / negative.max(1) as f64
}

/// Ratio for headline display. `None` (shown as "N/A") when there are no
/// negative replies at all.
#[must_use]
pub fn headline_ratio(positive: usize, negative: usize) -> Option<f64> {
    (negative > 0).then(|| pos_neg_ratio(positive, negative))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn rec(sentiment: Sentiment, score: f32) -> ReplyRecord {
        ReplyRecord {
            review: String::new(),
            at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            source: "PineLabs".to_owned(),
            sentiment,
            score,
            category: None,
        }
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let records = vec![
            rec(Sentiment::Positive, 0.9),
            rec(Sentiment::Positive, 0.8),
            rec(Sentiment::Neutral, 0.6),
            rec(Sentiment::Negative, 0.7),
            rec(Sentiment::Negative, 0.5),
            rec(Sentiment::Negative, 0.4),
            rec(Sentiment::Neutral, 0.3),
        ];
        let dist = sentiment_distribution(&records);
        let sum: f64 = Sentiment::ALL.iter().map(|s| dist.percent(*s)).sum();
        assert!((sum - 100.0).abs() < 1e-9, "sum was {sum}");
        assert_eq!(dist.total(), 7);
        assert_eq!(dist.counts.negative, 3);
    }

    #[test]
    fn mean_score_is_average_confidence() {
        let dist = sentiment_distribution(&[rec(Sentiment::Positive, 0.5), rec(Sentiment::Negative, 1.0)]);
        assert!((dist.mean_score - 0.75).abs() < 1e-9);
    }

    #[test]
    fn empty_set_has_zero_percentages() {
        let dist = sentiment_distribution(&[]);
        assert_eq!(dist.total(), 0);
        assert!(dist.percent(Sentiment::Positive).abs() < f64::EPSILON);
        assert!(dist.mean_score.abs() < f64::EPSILON);
    }

    #[test]
    fn ratio_with_no_negatives_is_positive_count() {
        assert!((pos_neg_ratio(20, 0) - 20.0).abs() < f64::EPSILON);
        assert!((pos_neg_ratio(20, 4) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn headline_ratio_is_na_without_negatives() {
        assert_eq!(headline_ratio(20, 0), None);
        assert_eq!(headline_ratio(3, 2), Some(1.5));
    }
}
