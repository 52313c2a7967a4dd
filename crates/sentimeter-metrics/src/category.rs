use std::collections::BTreeMap;

use sentimeter_core::{Category, ReplyRecord, Sentiment};

use crate::distribution::SentimentCounts;
use crate::error::ViewError;

/// Sentiment mix within one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow {
    pub category: Category,
    pub counts: SentimentCounts,
}

impl CategoryRow {
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.total()
    }

    #[must_use]
    pub fn percent(&self, sentiment: Sentiment) -> f64 {
        self.counts.percent(sentiment)
    }
}

fn tally_by_category(records: &[ReplyRecord]) -> BTreeMap<Category, SentimentCounts> {
    let mut by_category: BTreeMap<Category, SentimentCounts> = BTreeMap::new();
    for record in records {
        if let Some(category) = record.category {
            by_category.entry(category).or_default().add(record.sentiment);
        }
    }
    by_category
}

/// Per-category sentiment percentages, largest category first.
///
/// Records without a category are left out. `unclassified` is its own row.
/// Ties keep the fixed category order.
///
/// # Errors
///
/// [`ViewError::NotEnoughData`] when no record carries a category.
pub fn category_breakdown(records: &[ReplyRecord]) -> Result<Vec<CategoryRow>, ViewError> {
    let by_category = tally_by_category(records);
    if by_category.is_empty() {
        return Err(ViewError::not_enough(
            "category breakdown",
            "no replies carry a category",
        ));
    }

    let mut rows: Vec<CategoryRow> = by_category
        .into_iter()
        .map(|(category, counts)| CategoryRow { category, counts })
        .collect();
    rows.sort_by(|a, b| b.total().cmp(&a.total()));
    Ok(rows)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryScore {
    pub category: Category,
    pub positive_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrengthsWeaknesses {
    pub strengths: Vec<CategoryScore>,
    pub weaknesses: Vec<CategoryScore>,
}

/// Best two and worst two categories by positive share.
///
/// With fewer than four categories the two lists overlap.
///
/// # Errors
///
/// [`ViewError::NotEnoughData`] when no record carries a category.
pub fn strengths_and_weaknesses(records: &[ReplyRecord]) -> Result<StrengthsWeaknesses, ViewError> {
    let by_category = tally_by_category(records);
    if by_category.is_empty() {
        return Err(ViewError::not_enough(
            "strengths and weaknesses",
            "no replies carry a category",
        ));
    }

    let mut ranked: Vec<CategoryScore> = by_category
        .into_iter()
        .map(|(category, counts)| CategoryScore {
            category,
            positive_pct: counts.percent(Sentiment::Positive),
        })
        .collect();
    ranked.sort_by(|a, b| b.positive_pct.total_cmp(&a.positive_pct));

    let strengths = ranked.iter().take(2).cloned().collect();
    let weaknesses = ranked[ranked.len().saturating_sub(2)..].to_vec();
    Ok(StrengthsWeaknesses {
        strengths,
        weaknesses,
    })
}
