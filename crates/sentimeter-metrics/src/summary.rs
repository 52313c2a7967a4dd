//! Interpretation helpers for the summary document.

use sentimeter_core::{Category, Sentiment};

use crate::category::CategoryRow;

/// Fallback recommendations when no category data is available.
pub const GENERIC_RECOMMENDATIONS: [&str; 3] = [
    "Enhance customer service response time and quality of resolution",
    "Address product quality concerns highlighted in negative feedback",
    "Improve communication channels for better customer engagement",
];

#[must_use]
pub fn positive_status(positive_pct: f64) -> &'static str {
    if positive_pct > 60.0 {
        "Good"
    } else if positive_pct > 40.0 {
        "Average"
    } else {
        "Needs improvement"
    }
}

#[must_use]
pub fn ratio_status(ratio: f64) -> &'static str {
    if ratio > 2.0 {
        "Good"
    } else if ratio > 1.0 {
        "Average"
    } else {
        "Needs improvement"
    }
}

/// Closing paragraph keyed on the overall positive share.
#[must_use]
pub fn conclusion(positive_pct: f64) -> String {
    if positive_pct > 70.0 {
        format!(
            "With {positive_pct:.1}% positive sentiment, overall customer satisfaction is high. \
             Focus on maintaining strengths while addressing specific improvement areas to \
             further enhance customer experience."
        )
    } else if positive_pct > 50.0 {
        format!(
            "With {positive_pct:.1}% positive sentiment, customer satisfaction is moderate. \
             There are significant opportunities to improve by addressing the negative \
             feedback areas highlighted in this report."
        )
    } else {
        format!(
            "With only {positive_pct:.1}% positive sentiment, there are critical areas \
             requiring immediate attention. We recommend a comprehensive review of the \
             highlighted issues and development of an action plan to address customer concerns."
        )
    }
}

/// Up to `n` categories with the highest negative share, worst first.
#[must_use]
pub fn recommendation_categories(rows: &[CategoryRow], n: usize) -> Vec<Category> {
    let mut ranked: Vec<&CategoryRow> = rows.iter().collect();
    ranked.sort_by(|a, b| {
        b.percent(Sentiment::Negative)
            .total_cmp(&a.percent(Sentiment::Negative))
    });
    ranked.into_iter().take(n).map(|r| r.category).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::SentimentCounts;

    fn row(category: Category, positive: usize, negative: usize) -> CategoryRow {
        CategoryRow {
            category,
            counts: SentimentCounts {
                positive,
                neutral: 0,
                negative,
            },
        }
    }

    #[test]
    fn status_thresholds_are_exclusive() {
        assert_eq!(positive_status(60.0), "Average");
        assert_eq!(positive_status(60.1), "Good");
        assert_eq!(positive_status(40.0), "Needs improvement");
        assert_eq!(ratio_status(2.0), "Average");
        assert_eq!(ratio_status(2.5), "Good");
        assert_eq!(ratio_status(1.0), "Needs improvement");
    }

    #[test]
    fn conclusion_picks_band() {
        assert!(conclusion(75.0).contains("satisfaction is high"));
        assert!(conclusion(55.0).starts_with("With 55.0% positive"));
        assert!(conclusion(20.0).starts_with("With only 20.0%"));
    }

    #[test]
    fn recommendations_follow_negative_share() {
        let rows = vec![
            row(Category::Onboarding, 9, 1),
            row(Category::Settlement, 1, 9),
            row(Category::Pricing, 5, 5),
            row(Category::DeviceIssue, 2, 8),
        ];
        assert_eq!(
            recommendation_categories(&rows, 3),
            vec![Category::Settlement, Category::DeviceIssue, Category::Pricing]
        );
    }
}
