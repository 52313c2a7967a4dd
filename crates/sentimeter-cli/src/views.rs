//! `analyze`, `compare` and `export` handlers.
//!
//! Each view renders into its own section. A view that cannot be computed
//! prints a one-line notice and the remaining sections still render.

use std::fmt::{self, Write as _};
use std::path::Path;

use anyhow::Context;
use chrono::Weekday;
use sentimeter_core::{ReplyRecord, Sentiment};
use sentimeter_metrics::{
    category_breakdown, company_comparison, competitor_trends, headline_ratio, peak_buckets,
    sentiment_distribution, sentiment_trend, strengths_and_weaknesses, summarize_trend,
    top_negative_keywords, top_reviews, weekday_breakdown, weekday_insights, Granularity,
    RecordFilter, ViewError,
};

use crate::context::AppContext;
use crate::ScopeArgs;

const KEYWORD_LIMIT: usize = 10;
const TOP_REVIEW_LIMIT: usize = 5;
const REVIEW_PREVIEW_CHARS: usize = 100;

pub(crate) async fn run_analyze(
    ctx: &AppContext,
    scope: &ScopeArgs,
    granularity: Granularity,
) -> anyhow::Result<()> {
    let selection = ctx.select(scope).await?;
    let label = selection.focus.as_deref().unwrap_or("All companies");
    print!(
        "{}",
        render_analysis(label, &selection.records, granularity, selection.focus.is_some())?
    );
    Ok(())
}

pub(crate) async fn run_compare(
    ctx: &AppContext,
    scope: &ScopeArgs,
    granularity: Granularity,
) -> anyhow::Result<()> {
    if let Some(company) = &scope.company {
        tracing::info!(company = %company, "compare covers every tracked company; ignoring --company");
    }
    let all = ctx.load_records(scope.days, scope.refresh).await?;
    let records = AppContext::comparison_records(&all, scope);
    let names = ctx.companies.names();
    print!("{}", render_comparison(&records, &names, granularity)?);
    Ok(())
}

pub(crate) async fn run_export(
    ctx: &AppContext,
    scope: &ScopeArgs,
    sentiments: Vec<Sentiment>,
    sources: Vec<String>,
    output: &Path,
) -> anyhow::Result<()> {
    let selection = ctx.select(scope).await?;
    let sources = sources
        .into_iter()
        .map(|s| {
            ctx.companies
                .canonical_name(&s)
                .map_or(s.clone(), str::to_owned)
        })
        .collect();
    let filter = RecordFilter {
        sentiments,
        sources,
        ..RecordFilter::default()
    };
    let records = filter.apply(&selection.records);

    sentimeter_store::export_csv(output, &records)
        .with_context(|| format!("failed to export to {}", output.display()))?;
    println!("exported {} replies to {}", records.len(), output.display());
    Ok(())
}

fn not_enough(out: &mut String, err: &ViewError) -> fmt::Result {
    writeln!(out, "  {err}")
}

pub(crate) fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub(crate) fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > REVIEW_PREVIEW_CHARS {
        let cut: String = flat.chars().take(REVIEW_PREVIEW_CHARS).collect();
        format!("{cut}…")
    } else {
        flat
    }
}

#[allow(clippy::too_many_lines)]
pub(crate) fn render_analysis(
    label: &str,
    records: &[ReplyRecord],
    granularity: Granularity,
    focused: bool,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "== Sentiment analysis: {label} ==")?;
    if records.is_empty() {
        writeln!(out, "{}", ViewError::Empty)?;
        return Ok(out);
    }

    // Distribution
    let dist = sentiment_distribution(records);
    writeln!(out)?;
    writeln!(out, "Distribution ({} replies)", dist.total())?;
    for sentiment in Sentiment::ALL {
        writeln!(
            out,
            "  {:<10}{:>6}{:>8.1}%",
            sentiment.as_str(),
            dist.counts.get(sentiment),
            dist.percent(sentiment)
        )?;
    }
    let ratio = headline_ratio(dist.counts.positive, dist.counts.negative)
        .map_or_else(|| "N/A".to_owned(), |r| format!("{r:.2}"));
    writeln!(out, "  pos:neg ratio {ratio}, mean confidence {:.2}", dist.mean_score)?;

    // Categories
    writeln!(out)?;
    writeln!(out, "Categories")?;
    match category_breakdown(records) {
        Ok(rows) => {
            writeln!(
                out,
                "  {:<22}{:>6}{:>10}{:>10}{:>10}",
                "CATEGORY", "TOTAL", "POS%", "NEU%", "NEG%"
            )?;
            for row in &rows {
                writeln!(
                    out,
                    "  {:<22}{:>6}{:>10.1}{:>10.1}{:>10.1}",
                    row.category.as_str(),
                    row.total(),
                    row.percent(Sentiment::Positive),
                    row.percent(Sentiment::Neutral),
                    row.percent(Sentiment::Negative)
                )?;
            }
        }
        Err(e) => not_enough(&mut out, &e)?,
    }

    // Trend
    writeln!(out)?;
    writeln!(out, "Trend ({granularity})")?;
    let buckets = sentiment_trend(records, granularity);
    for bucket in &buckets {
        writeln!(
            out,
            "  {}  +{:<5} ={:<5} -{:<5}",
            bucket.start, bucket.counts.positive, bucket.counts.neutral, bucket.counts.negative
        )?;
    }
    let summary = summarize_trend(&buckets);
    writeln!(
        out,
        "  direction {} (positive {:+.1}%, negative {:+.1}%, composite {:+.1})",
        summary.direction,
        summary.positive_trend_pct,
        summary.negative_trend_pct,
        summary.composite
    )?;
    match peak_buckets(&buckets) {
        Some(peaks) => writeln!(
            out,
            "  peak positive {} ({}), peak negative {} ({})",
            peaks.positive.0, peaks.positive.1, peaks.negative.0, peaks.negative.1
        )?,
        None => not_enough(
            &mut out,
            &ViewError::NotEnoughData {
                view: "peak analysis",
                reason: "fewer than 3 time buckets".to_owned(),
            },
        )?,
    }

    // Day of week
    writeln!(out)?;
    writeln!(out, "Day of week")?;
    let days = weekday_breakdown(records);
    for row in &days {
        let pct = row
            .positive_pct
            .map_or_else(|| "-".to_owned(), |p| format!("{p:.1}%"));
        writeln!(
            out,
            "  {:<10}{:>6}  positive {pct}",
            day_name(row.day),
            row.counts.total()
        )?;
    }
    if let Some(insights) = weekday_insights(&days) {
        writeln!(
            out,
            "  best {} ({:.1}%), worst {} ({:.1}%)",
            day_name(insights.best.0),
            insights.best.1,
            day_name(insights.worst.0),
            insights.worst.1
        )?;
        let fmt_avg = |v: Option<f64>| v.map_or_else(|| "-".to_owned(), |v| format!("{v:.1}%"));
        writeln!(
            out,
            "  weekday avg {}, weekend avg {}",
            fmt_avg(insights.weekday_avg),
            fmt_avg(insights.weekend_avg)
        )?;
    }

    // Keywords
    writeln!(out)?;
    writeln!(out, "Top negative keywords")?;
    let keywords = top_negative_keywords(records, KEYWORD_LIMIT);
    if keywords.is_empty() {
        writeln!(out, "  none")?;
    }
    for keyword in &keywords {
        writeln!(out, "  {:<20}{:>5}", keyword.word, keyword.count)?;
    }

    // Top reviews
    for sentiment in [Sentiment::Positive, Sentiment::Negative] {
        writeln!(out)?;
        writeln!(out, "Top {sentiment} replies")?;
        let top = top_reviews(records, sentiment, TOP_REVIEW_LIMIT);
        if top.is_empty() {
            writeln!(out, "  none")?;
        }
        for record in top {
            writeln!(
                out,
                "  [{:.2}] {} ({})",
                record.score,
                preview(&record.review),
                record.at.format("%Y-%m-%d")
            )?;
        }
    }

    if focused {
        writeln!(out)?;
        writeln!(out, "Strengths and weaknesses")?;
        match strengths_and_weaknesses(records) {
            Ok(sw) => {
                for s in &sw.strengths {
                    writeln!(out, "  + {} ({:.1}% positive)", s.category, s.positive_pct)?;
                }
                for w in &sw.weaknesses {
                    writeln!(out, "  - {} ({:.1}% positive)", w.category, w.positive_pct)?;
                }
            }
            Err(e) => not_enough(&mut out, &e)?,
        }
    }

    Ok(out)
}

pub(crate) fn render_comparison(
    records: &[ReplyRecord],
    companies: &[&str],
    granularity: Granularity,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "== Company comparison ==")?;

    let rows = company_comparison(records, companies);
    if rows.is_empty() {
        writeln!(out, "{}", ViewError::Empty)?;
        return Ok(out);
    }
    writeln!(
        out,
        "{:<16}{:>7}{:>9}{:>9}{:>9}",
        "COMPANY", "TOTAL", "POS%", "NEG%", "POS:NEG"
    )?;
    for row in &rows {
        writeln!(
            out,
            "{:<16}{:>7}{:>9.1}{:>9.1}{:>9.2}",
            row.company,
            row.counts.total(),
            row.positive_pct,
            row.negative_pct,
            row.pos_neg_ratio
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Positive % over time ({granularity})")?;
    let trends = competitor_trends(records, companies, granularity);
    for trend in &trends {
        let series: Vec<String> = trend
            .points
            .iter()
            .map(|(start, pct)| format!("{start}={pct:.1}"))
            .collect();
        writeln!(out, "  {}: {}", trend.company, series.join(", "))?;
        match trend.change {
            Some(change) => writeln!(
                out,
                "    first half {:.1}%, second half {:.1}%, change {:+.1} pts ({:+.1}%)",
                change.first_half, change.second_half, change.change, change.change_pct
            )?,
            None => writeln!(out, "    not enough data for a change (needs 2+ buckets)")?,
        }
    }

    let mut changes: Vec<(&str, f64)> = trends
        .iter()
        .filter_map(|t| t.change.map(|c| (t.company.as_str(), c.change)))
        .collect();
    if changes.len() > 1 {
        changes.sort_by(|a, b| b.1.total_cmp(&a.1));
        if let (Some(best), Some(worst)) = (changes.first(), changes.last()) {
            writeln!(
                out,
                "  most improved {} ({:+.1} pts), least improved {} ({:+.1} pts)",
                best.0, best.1, worst.0, worst.1
            )?;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use sentimeter_core::Category;

    use super::*;

    fn rec(source: &str, day: u32, sentiment: Sentiment, category: Option<Category>) -> ReplyRecord {
        ReplyRecord {
            review: format!("settlement delayed for merchant {day}"),
            at: Utc.with_ymd_and_hms(2025, 3, day, 10, 0, 0).unwrap(),
            source: source.to_owned(),
            sentiment,
            score: 0.8,
            category,
        }
    }

    #[test]
    fn analysis_of_empty_selection_says_so() {
        let out = render_analysis("PineLabs", &[], Granularity::Daily, true).unwrap();
        assert!(out.contains("no replies match the current filters"));
    }

    #[test]
    fn analysis_reports_missing_categories_locally() {
        let records = vec![
            rec("PineLabs", 1, Sentiment::Positive, None),
            rec("PineLabs", 2, Sentiment::Negative, None),
        ];
        let out = render_analysis("PineLabs", &records, Granularity::Daily, true).unwrap();
        assert!(out.contains("not enough data for category breakdown"));
        assert!(out.contains("not enough data for peak analysis"));
        // Sections after the failing ones still render.
        assert!(out.contains("Day of week"));
        assert!(out.contains("Strengths and weaknesses"));
        assert!(out.contains("pos:neg ratio 1.00"));
    }

    #[test]
    fn analysis_shows_na_ratio_without_negatives() {
        let records = vec![rec("Paytm", 3, Sentiment::Positive, Some(Category::Pricing))];
        let out = render_analysis("All companies", &records, Granularity::Weekly, false).unwrap();
        assert!(out.contains("pos:neg ratio N/A"));
        assert!(out.contains("Monday"));
        assert!(!out.contains("Strengths and weaknesses"));
    }

    #[test]
    fn comparison_ranks_and_reports_changes() {
        let records = vec![
            rec("PineLabs", 3, Sentiment::Positive, None),
            rec("PineLabs", 10, Sentiment::Negative, None),
            rec("Razorpay", 3, Sentiment::Negative, None),
            rec("Razorpay", 10, Sentiment::Positive, None),
            rec("Razorpay", 10, Sentiment::Positive, None),
        ];
        let out = render_comparison(&records, &["PineLabs", "Razorpay", "Paytm"], Granularity::Weekly)
            .unwrap();
        let razorpay = out.find("Razorpay").unwrap();
        let pinelabs = out.find("PineLabs").unwrap();
        assert!(razorpay < pinelabs);
        assert!(out.contains("most improved Razorpay"));
        assert!(!out.contains("Paytm"));
    }

    #[test]
    fn preview_truncates_long_text() {
        let long = "a ".repeat(200);
        let short = preview(&long);
        assert_eq!(short.chars().count(), REVIEW_PREVIEW_CHARS + 1);
        assert!(short.ends_with('…'));
        assert_eq!(preview("two\nlines"), "two lines");
    }
}
