//! Time-bucketed sentiment counts and the direction heuristic over them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use sentimeter_core::ReplyRecord;

use crate::distribution::SentimentCounts;
use crate::mean;

/// Composite score beyond which a trend counts as moving.
const DIRECTION_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    #[default]
    Daily,
    /// Weeks start on Monday.
    Weekly,
    Monthly,
}

impl Granularity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Self::Daily),
            "weekly" | "week" => Ok(Self::Weekly),
            "monthly" | "month" => Ok(Self::Monthly),
            other => Err(format!(
                "unknown granularity '{other}' (expected daily, weekly or monthly)"
            )),
        }
    }
}

/// First calendar day (UTC) of the bucket containing `at`.
#[must_use]
pub fn bucket_start(at: DateTime<Utc>, granularity: Granularity) -> NaiveDate {
    let day = at.date_naive();
    match granularity {
        Granularity::Daily => day,
        Granularity::Weekly => day
            .checked_sub_days(Days::new(u64::from(day.weekday().num_days_from_monday())))
            .unwrap_or(day),
        Granularity::Monthly => day.with_day(1).unwrap_or(day),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendBucket {
    pub start: NaiveDate,
    pub counts: SentimentCounts,
}

/// Sentiment counts per bucket, oldest first.
///
/// Only buckets that contain at least one reply are returned; classes absent
/// from a bucket count as zero.
#[must_use]
pub fn sentiment_trend(records: &[ReplyRecord], granularity: Granularity) -> Vec<TrendBucket> {
    let mut buckets: BTreeMap<NaiveDate, SentimentCounts> = BTreeMap::new();
    for record in records {
        buckets
            .entry(bucket_start(record.at, granularity))
            .or_default()
            .add(record.sentiment);
    }
    buckets
        .into_iter()
        .map(|(start, counts)| TrendBucket { start, counts })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
}

impl TrendDirection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Improving => "Improving",
            Self::Stable => "Stable",
            Self::Declining => "Declining",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendSummary {
    pub positive_first_mean: f64,
    pub positive_second_mean: f64,
    pub positive_trend_pct: f64,
    pub negative_first_mean: f64,
    pub negative_second_mean: f64,
    pub negative_trend_pct: f64,
    /// `positive_trend_pct - negative_trend_pct`.
    pub composite: f64,
    pub direction: TrendDirection,
}

fn half_means(buckets: &[TrendBucket], pick: impl Fn(&SentimentCounts) -> usize) -> (f64, f64, f64) {
    #[allow(clippy::cast_precision_loss)]
    let series: Vec<f64> = buckets.iter().map(|b| pick(&b.counts) as f64).collect();
    let (first, second) = series.split_at(series.len() / 2);
    let first_mean = mean(first);
    let second_mean = mean(second);
    let pct = if first_mean > 0.0 {
        (second_mean - first_mean) / first_mean * 100.0
    } else {
        0.0
    };
    (first_mean, second_mean, pct)
}

/// Compare the first and second half of an ordered bucket sequence.
///
/// The split is at `len / 2`, so the second half holds the extra bucket of an
/// odd-length sequence and a single bucket leaves the first half empty.
#[must_use]
pub fn summarize_trend(buckets: &[TrendBucket]) -> TrendSummary {
    let (positive_first_mean, positive_second_mean, positive_trend_pct) =
        half_means(buckets, |c| c.positive);
    let (negative_first_mean, negative_second_mean, negative_trend_pct) =
        half_means(buckets, |c| c.negative);

    let composite = positive_trend_pct - negative_trend_pct;
    let direction = if composite > DIRECTION_THRESHOLD {
        TrendDirection::Improving
    } else if composite < -DIRECTION_THRESHOLD {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    };

    TrendSummary {
        positive_first_mean,
        positive_second_mean,
        positive_trend_pct,
        negative_first_mean,
        negative_second_mean,
        negative_trend_pct,
        composite,
        direction,
    }
}

/// Busiest buckets for each polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peaks {
    pub positive: (NaiveDate, usize),
    pub negative: (NaiveDate, usize),
}

/// Peak positive and negative buckets; needs at least three buckets.
///
/// Ties go to the earliest bucket.
#[must_use]
pub fn peak_buckets(buckets: &[TrendBucket]) -> Option<Peaks> {
    if buckets.len() < 3 {
        return None;
    }
    let peak = |pick: fn(&SentimentCounts) -> usize| {
        buckets.iter().fold(None, |best: Option<(NaiveDate, usize)>, b| {
            let n = pick(&b.counts);
            match best {
                Some((_, top)) if top >= n => best,
                _ => Some((b.start, n)),
            }
        })
    };
    Some(Peaks {
        positive: peak(|c| c.positive)?,
        negative: peak(|c| c.negative)?,
    })
}

#[cfg(test)]
#[path = "trend_test.rs"]
mod tests;
