//! Derived views over annotated replies.
//!
//! Every function here is pure: it takes a record slice (already filtered by
//! the caller) and returns counts, percentages, trends, or rankings. Nothing
//! performs I/O.

pub mod category;
pub mod company;
pub mod distribution;
pub mod error;
pub mod filter;
pub mod keywords;
pub mod reviews;
pub mod summary;
pub mod trend;
pub mod weekday;

pub use category::{category_breakdown, strengths_and_weaknesses, CategoryRow, CategoryScore, StrengthsWeaknesses};
pub use company::{company_comparison, competitor_trends, CompanyRow, CompanyTrend, HalfChange};
pub use distribution::{
    headline_ratio, pos_neg_ratio, sentiment_distribution, SentimentCounts, SentimentDistribution,
};
pub use error::ViewError;
pub use filter::{select_company, CompanySelection, RecordFilter};
pub use keywords::{top_negative_keywords, KeywordCount};
pub use reviews::{recent_negative_texts, top_reviews};
pub use summary::{
    conclusion, positive_status, ratio_status, recommendation_categories, GENERIC_RECOMMENDATIONS,
};
pub use trend::{
    bucket_start, peak_buckets, sentiment_trend, summarize_trend, Granularity, Peaks, TrendBucket,
    TrendDirection, TrendSummary,
};
pub use weekday::{weekday_breakdown, weekday_insights, WeekdayInsights, WeekdayRow};

/// `part / whole * 100`, or `0.0` when `whole` is zero.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Arithmetic mean, or `0.0` for an empty slice.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
