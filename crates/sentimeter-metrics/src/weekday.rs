use chrono::{Datelike, Weekday};
use sentimeter_core::ReplyRecord;

use crate::distribution::SentimentCounts;
use crate::mean;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeekdayRow {
    pub day: Weekday,
    pub counts: SentimentCounts,
    /// `None` for a day without replies.
    pub positive_pct: Option<f64>,
}

/// Sentiment counts per day of week, always Monday through Sunday.
#[must_use]
pub fn weekday_breakdown(records: &[ReplyRecord]) -> Vec<WeekdayRow> {
    let mut counts = [SentimentCounts::default(); 7];
    for record in records {
        let idx = record.at.weekday().num_days_from_monday() as usize;
        counts[idx].add(record.sentiment);
    }
    WEEK.iter()
        .zip(counts)
        .map(|(&day, counts)| WeekdayRow {
            day,
            counts,
            positive_pct: (counts.total() > 0)
                .then(|| counts.percent(sentimeter_core::Sentiment::Positive)),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeekdayInsights {
    pub best: (Weekday, f64),
    pub worst: (Weekday, f64),
    /// Mean positive % over Monday..Friday days with data.
    pub weekday_avg: Option<f64>,
    /// Mean positive % over Saturday and Sunday with data.
    pub weekend_avg: Option<f64>,
}

/// Best and worst day by positive share, plus weekday vs weekend means.
///
/// Days without replies are ignored. `None` when no day has data.
#[must_use]
pub fn weekday_insights(rows: &[WeekdayRow]) -> Option<WeekdayInsights> {
    let with_data: Vec<(Weekday, f64)> = rows
        .iter()
        .filter_map(|r| r.positive_pct.map(|p| (r.day, p)))
        .collect();

    let mut best = *with_data.first()?;
    let mut worst = best;
    for &(day, pct) in &with_data[1..] {
        if pct > best.1 {
            best = (day, pct);
        }
        if pct < worst.1 {
            worst = (day, pct);
        }
    }

    let avg = |weekend: bool| {
        let values: Vec<f64> = with_data
            .iter()
            .filter(|(day, _)| matches!(day, Weekday::Sat | Weekday::Sun) == weekend)
            .map(|(_, pct)| *pct)
            .collect();
        (!values.is_empty()).then(|| mean(&values))
    };

    Some(WeekdayInsights {
        best,
        worst,
        weekday_avg: avg(false),
        weekend_avg: avg(true),
    })
}
