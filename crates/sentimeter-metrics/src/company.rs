use std::collections::BTreeMap;

use chrono::NaiveDate;
use sentimeter_core::{ReplyRecord, Sentiment};

use crate::distribution::{pos_neg_ratio, SentimentCounts};
use crate::trend::{bucket_start, Granularity};
use crate::{mean, percent};

/// One company's line in the comparison table.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyRow {
    pub company: String,
    pub counts: SentimentCounts,
    pub positive_pct: f64,
    pub negative_pct: f64,
    /// `positive / max(negative, 1)`.
    pub pos_neg_ratio: f64,
}

/// Compare `companies` side by side, best positive share first.
///
/// Companies with no replies in `records` are omitted.
#[must_use]
pub fn company_comparison(records: &[ReplyRecord], companies: &[&str]) -> Vec<CompanyRow> {
    let mut rows: Vec<CompanyRow> = companies
        .iter()
        .filter_map(|&company| {
            let counts = SentimentCounts::tally(records.iter().filter(|r| r.source == company));
            (counts.total() > 0).then(|| CompanyRow {
                company: company.to_owned(),
                positive_pct: counts.percent(Sentiment::Positive),
                negative_pct: counts.percent(Sentiment::Negative),
                pos_neg_ratio: pos_neg_ratio(counts.positive, counts.negative),
                counts,
            })
        })
        .collect();
    rows.sort_by(|a, b| b.positive_pct.total_cmp(&a.positive_pct));
    rows
}

/// Change between the first and second half of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfChange {
    pub first_half: f64,
    pub second_half: f64,
    /// `second_half - first_half`, in percentage points.
    pub change: f64,
    /// Relative change in percent; `0.0` when the first half is zero.
    pub change_pct: f64,
}

impl HalfChange {
    /// Split at `len / 2`; the second half takes the extra element.
    ///
    /// `None` for fewer than two points.
    #[must_use]
    pub fn of(series: &[f64]) -> Option<Self> {
        if series.len() < 2 {
            return None;
        }
        let (first, second) = series.split_at(series.len() / 2);
        let first_half = mean(first);
        let second_half = mean(second);
        let change = second_half - first_half;
        let change_pct = if first_half > 0.0 {
            change / first_half * 100.0
        } else {
            0.0
        };
        Some(Self {
            first_half,
            second_half,
            change,
            change_pct,
        })
    }
}

/// Positive-share series for one company.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyTrend {
    pub company: String,
    /// `(bucket start, positive %)`, oldest first, buckets with replies only.
    pub points: Vec<(NaiveDate, f64)>,
    pub change: Option<HalfChange>,
}

/// Per-company positive-percentage series over time buckets.
///
/// Percentages are rounded to one decimal per bucket before the half
/// comparison. Companies with no replies are omitted.
#[must_use]
pub fn competitor_trends(
    records: &[ReplyRecord],
    companies: &[&str],
    granularity: Granularity,
) -> Vec<CompanyTrend> {
    companies
        .iter()
        .filter_map(|&company| {
            let mut buckets: BTreeMap<NaiveDate, SentimentCounts> = BTreeMap::new();
            for record in records.iter().filter(|r| r.source == company) {
                buckets
                    .entry(bucket_start(record.at, granularity))
                    .or_default()
                    .add(record.sentiment);
            }
            if buckets.is_empty() {
                return None;
            }

            let points: Vec<(NaiveDate, f64)> = buckets
                .into_iter()
                .map(|(start, counts)| (start, round1(percent(counts.positive, counts.total()))))
                .collect();
            let series: Vec<f64> = points.iter().map(|(_, pct)| *pct).collect();
            Some(CompanyTrend {
                company: company.to_owned(),
                change: HalfChange::of(&series),
                points,
            })
        })
        .collect()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn rec(source: &str, day: u32, sentiment: Sentiment) -> ReplyRecord {
        ReplyRecord {
            review: String::new(),
            at: Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap(),
            source: source.to_owned(),
            sentiment,
            score: 0.5,
            category: None,
        }
    }

    #[test]
    fn comparison_ranks_by_positive_share() {
        let records = vec![
            rec("PineLabs", 1, Sentiment::Positive),
            rec("PineLabs", 1, Sentiment::Negative),
            rec("Razorpay", 1, Sentiment::Positive),
            rec("Razorpay", 2, Sentiment::Positive),
            rec("Razorpay", 3, Sentiment::Neutral),
        ];
        let rows = company_comparison(&records, &["PineLabs", "Razorpay", "Paytm"]);
        let names: Vec<&str> = rows.iter().map(|r| r.company.as_str()).collect();
        assert_eq!(names, vec!["Razorpay", "PineLabs"]);
        assert!((rows[0].pos_neg_ratio - 2.0).abs() < f64::EPSILON);
        assert!((rows[1].pos_neg_ratio - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn half_change_splits_with_extra_point_in_second_half() {
        let change = HalfChange::of(&[40.0, 50.0, 70.0]).unwrap();
        assert!((change.first_half - 40.0).abs() < 1e-9);
        assert!((change.second_half - 60.0).abs() < 1e-9);
        assert!((change.change - 20.0).abs() < 1e-9);
        assert!((change.change_pct - 50.0).abs() < 1e-9);
        assert!(HalfChange::of(&[10.0]).is_none());
    }

    #[test]
    fn half_change_from_zero_has_zero_pct() {
        let change = HalfChange::of(&[0.0, 50.0]).unwrap();
        assert!(change.change_pct.abs() < f64::EPSILON);
        assert!((change.change - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn competitor_series_are_per_bucket() {
        let records = vec![
            rec("Paytm", 3, Sentiment::Positive),
            rec("Paytm", 3, Sentiment::Negative),
            rec("Paytm", 3, Sentiment::Negative),
            rec("Paytm", 4, Sentiment::Positive),
        ];
        let trends = competitor_trends(&records, &["Paytm", "PineLabs"], Granularity::Daily);
        assert_eq!(trends.len(), 1);
        let points: Vec<f64> = trends[0].points.iter().map(|p| p.1).collect();
        assert_eq!(points, vec![33.3, 100.0]);
        assert!(trends[0].change.is_some());
    }
}
