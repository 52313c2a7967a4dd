use chrono::NaiveDate;
use sentimeter_core::{Category, ReplyRecord, Sentiment};

/// Record filter shared by the analysis views and the export command.
///
/// Empty lists match everything. Date bounds are inclusive calendar days (UTC).
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub categories: Vec<Category>,
    pub sentiments: Vec<Sentiment>,
    /// Canonical company names; compared case-insensitively.
    pub sources: Vec<String>,
}

impl RecordFilter {
    #[must_use]
    pub fn matches(&self, record: &ReplyRecord) -> bool {
        let day = record.at.date_naive();
        if self.from.is_some_and(|from| day < from) || self.to.is_some_and(|to| day > to) {
            return false;
        }
        if !self.categories.is_empty()
            && !record
                .category
                .is_some_and(|c| self.categories.contains(&c))
        {
            return false;
        }
        if !self.sentiments.is_empty() && !self.sentiments.contains(&record.sentiment) {
            return false;
        }
        self.sources.is_empty()
            || self
                .sources
                .iter()
                .any(|s| s.eq_ignore_ascii_case(&record.source))
    }

    #[must_use]
    pub fn apply(&self, records: &[ReplyRecord]) -> Vec<ReplyRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Result of narrowing a record set to one company.
#[derive(Debug, Clone)]
pub struct CompanySelection {
    pub records: Vec<ReplyRecord>,
    /// `true` when the company had no replies and the full set was kept.
    pub fell_back: bool,
}

/// Keep only `company`'s replies. `None` selects everything.
///
/// A company with zero replies falls back to the full set (with a warning)
/// so the views still render.
#[must_use]
pub fn select_company(records: &[ReplyRecord], company: Option<&str>) -> CompanySelection {
    let Some(company) = company else {
        return CompanySelection {
            records: records.to_vec(),
            fell_back: false,
        };
    };

    let selected: Vec<ReplyRecord> = records
        .iter()
        .filter(|r| r.source.eq_ignore_ascii_case(company))
        .cloned()
        .collect();

    if selected.is_empty() {
        tracing::warn!(company, "no replies for company; showing all companies instead");
        CompanySelection {
            records: records.to_vec(),
            fell_back: true,
        }
    } else {
        CompanySelection {
            records: selected,
            fell_back: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn rec(source: &str, day: u32, sentiment: Sentiment, category: Option<Category>) -> ReplyRecord {
        ReplyRecord {
            review: format!("{source} {day}"),
            at: Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap(),
            source: source.to_owned(),
            sentiment,
            score: 0.5,
            category,
        }
    }

    fn sample() -> Vec<ReplyRecord> {
        vec![
            rec("PineLabs", 1, Sentiment::Positive, Some(Category::Settlement)),
            rec("PineLabs", 5, Sentiment::Negative, Some(Category::Pricing)),
            rec("Paytm", 10, Sentiment::Neutral, None),
        ]
    }

    #[test]
    fn default_filter_matches_everything() {
        assert_eq!(RecordFilter::default().apply(&sample()).len(), 3);
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let filter = RecordFilter {
            from: NaiveDate::from_ymd_opt(2025, 3, 5),
            to: NaiveDate::from_ymd_opt(2025, 3, 10),
            ..RecordFilter::default()
        };
        let kept = filter.apply(&sample());
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn category_filter_drops_uncategorized() {
        let filter = RecordFilter {
            categories: vec![Category::Settlement, Category::Pricing],
            ..RecordFilter::default()
        };
        assert!(filter.apply(&sample()).iter().all(|r| r.source == "PineLabs"));
    }

    #[test]
    fn sentiment_and_source_filters_combine() {
        let filter = RecordFilter {
            sentiments: vec![Sentiment::Negative],
            sources: vec!["pinelabs".to_owned()],
            ..RecordFilter::default()
        };
        let kept = filter.apply(&sample());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].sentiment, Sentiment::Negative);
    }

    #[test]
    fn company_selection_narrows() {
        let selection = select_company(&sample(), Some("Paytm"));
        assert!(!selection.fell_back);
        assert_eq!(selection.records.len(), 1);
    }

    #[test]
    fn unknown_company_falls_back_to_all() {
        let selection = select_company(&sample(), Some("Razorpay"));
        assert!(selection.fell_back);
        assert_eq!(selection.records.len(), 3);
    }
}
