//! `report` handler: a Markdown summary document.

use std::fmt::{self, Write as _};
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use sentimeter_core::{AppConfig, ReplyRecord, Sentiment};
use sentimeter_metrics::{
    category_breakdown, company_comparison, conclusion, headline_ratio, pos_neg_ratio,
    positive_status, ratio_status, recent_negative_texts, recommendation_categories,
    sentiment_distribution, GENERIC_RECOMMENDATIONS,
};
use sentimeter_sentiment::ReportWriter;

use crate::context::AppContext;
use crate::pipeline::chat_client;
use crate::ScopeArgs;

const TOP_CATEGORIES: usize = 5;
const RECOMMENDED_CATEGORIES: usize = 3;
const NARRATIVE_INPUTS: usize = 5;

/// Everything the summary document is rendered from.
pub(crate) struct ReportInput<'a> {
    pub label: &'a str,
    pub window_days: u32,
    pub records: &'a [ReplyRecord],
    /// Records for the company comparison (all companies in the window).
    pub comparison_records: &'a [ReplyRecord],
    pub companies: &'a [&'a str],
    pub narrative: Option<&'a str>,
    pub generated: DateTime<Utc>,
}

pub(crate) async fn run_report(
    ctx: &AppContext,
    scope: &ScopeArgs,
    output: &Path,
    no_llm: bool,
) -> anyhow::Result<()> {
    let all = ctx.load_records(scope.days, scope.refresh).await?;
    let selection = ctx.narrow(&all, scope);
    let comparison_records = AppContext::comparison_records(&all, scope);
    let label = selection.focus.as_deref().unwrap_or("All companies");

    let narrative = if no_llm {
        None
    } else {
        improvement_narrative(&ctx.config, label, &selection.records).await
    };

    let names = ctx.companies.names();
    let markdown = render_report(&ReportInput {
        label,
        window_days: scope.days,
        records: &selection.records,
        comparison_records: &comparison_records,
        companies: &names,
        narrative: narrative.as_deref(),
        generated: Utc::now(),
    })?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(output, markdown)
        .with_context(|| format!("failed to write report to {}", output.display()))?;
    println!("report written to {}", output.display());
    Ok(())
}

/// Model-written improvement prose from the most recent negative replies.
///
/// Any failure is logged and yields `None`; the report then falls back to
/// category-based recommendations.
async fn improvement_narrative(
    config: &AppConfig,
    company: &str,
    records: &[ReplyRecord],
) -> Option<String> {
    let negatives = recent_negative_texts(records, NARRATIVE_INPUTS);
    if negatives.is_empty() {
        tracing::info!(company, "no negative replies; skipping improvement narrative");
        return None;
    }

    let chat = match chat_client(config) {
        Ok(chat) => chat,
        Err(e) => {
            tracing::warn!(error = %e, "improvement narrative unavailable");
            return None;
        }
    };
    let writer = ReportWriter::new(chat, &config.report_model);
    match writer.improvement_report(company, &negatives).await {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(company, error = %e, "improvement narrative failed");
            None
        }
    }
}

#[allow(clippy::too_many_lines)]
pub(crate) fn render_report(input: &ReportInput<'_>) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let records = input.records;

    writeln!(out, "# Sentiment Analysis Report: {}", input.label)?;
    writeln!(out)?;
    writeln!(
        out,
        "**Generated**: {}",
        input.generated.format("%Y-%m-%d %H:%M UTC")
    )?;
    writeln!(out, "**Window**: last {} days", input.window_days)?;
    writeln!(out)?;
    writeln!(out, "---")?;
    writeln!(out)?;

    // Executive summary
    let dist = sentiment_distribution(records);
    let mut sources: Vec<&str> = records.iter().map(|r| r.source.as_str()).collect();
    sources.sort_unstable();
    sources.dedup();
    let positive_pct = dist.percent(Sentiment::Positive);

    writeln!(out, "## Executive Summary")?;
    writeln!(out)?;
    if records.is_empty() {
        writeln!(out, "No replies match the current filters.")?;
    } else {
        writeln!(
            out,
            "This report covers {} replies across {} sources. Overall sentiment is \
             {:.1}% positive, {:.1}% negative and {:.1}% neutral.",
            dist.total(),
            sources.len(),
            positive_pct,
            dist.percent(Sentiment::Negative),
            dist.percent(Sentiment::Neutral)
        )?;
        let headline = headline_ratio(dist.counts.positive, dist.counts.negative)
            .map_or_else(|| "N/A".to_owned(), |r| format!("{r:.2}"));
        writeln!(out)?;
        writeln!(out, "Positive vs negative ratio: {headline}")?;
    }
    writeln!(out)?;

    // Categories
    let categories = category_breakdown(records);
    writeln!(out, "## Sentiment by Category")?;
    writeln!(out)?;
    match &categories {
        Ok(rows) => {
            writeln!(out, "| Category | Replies | Positive | Neutral | Negative |")?;
            writeln!(out, "|----------|---------|----------|---------|----------|")?;
            for row in rows.iter().take(TOP_CATEGORIES) {
                writeln!(
                    out,
                    "| {} | {} | {:.1}% | {:.1}% | {:.1}% |",
                    row.category,
                    row.total(),
                    row.percent(Sentiment::Positive),
                    row.percent(Sentiment::Neutral),
                    row.percent(Sentiment::Negative)
                )?;
            }
        }
        Err(e) => writeln!(out, "_{e}._")?,
    }
    writeln!(out)?;

    // Company comparison
    let companies = company_comparison(input.comparison_records, input.companies);
    if !companies.is_empty() {
        writeln!(out, "## Company Comparison")?;
        writeln!(out)?;
        writeln!(out, "| Company | Replies | Positive | Negative | Pos:Neg |")?;
        writeln!(out, "|---------|---------|----------|----------|---------|")?;
        for row in &companies {
            writeln!(
                out,
                "| {} | {} | {:.1}% | {:.1}% | {:.2} |",
                row.company,
                row.counts.total(),
                row.positive_pct,
                row.negative_pct,
                row.pos_neg_ratio
            )?;
        }
        writeln!(out)?;
    }

    // Key metrics
    let ratio = pos_neg_ratio(dist.counts.positive, dist.counts.negative);
    writeln!(out, "## Key Findings & Recommendations")?;
    writeln!(out)?;
    writeln!(out, "| Metric | Value | Interpretation |")?;
    writeln!(out, "|--------|-------|----------------|")?;
    writeln!(
        out,
        "| Total replies | {} | Sample size for analysis |",
        dist.total()
    )?;
    writeln!(
        out,
        "| Positive ratio | {positive_pct:.1}% | {} |",
        positive_status(positive_pct)
    )?;
    writeln!(
        out,
        "| Pos:Neg ratio | {ratio:.2} | {} - Target is >2.0 |",
        ratio_status(ratio)
    )?;
    writeln!(out)?;

    // Recommendations
    writeln!(out, "### Improvement Recommendations")?;
    writeln!(out)?;
    if let Some(narrative) = input.narrative {
        writeln!(out, "{}", narrative.trim())?;
    } else {
        writeln!(
            out,
            "Based on the sentiment analysis, focus on the most frequent negative \
             themes in customer feedback. Key areas to address:"
        )?;
        writeln!(out)?;
        let focus = categories
            .as_deref()
            .map(|rows| recommendation_categories(rows, RECOMMENDED_CATEGORIES))
            .unwrap_or_default();
        if focus.is_empty() {
            for line in GENERIC_RECOMMENDATIONS {
                writeln!(out, "- {line}")?;
            }
        } else {
            for category in focus {
                writeln!(
                    out,
                    "- Improve {category} by addressing customer pain points and enhancing \
                     service quality"
                )?;
            }
        }
    }
    writeln!(out)?;

    writeln!(out, "### Conclusion")?;
    writeln!(out)?;
    writeln!(out, "{}", conclusion(positive_pct))?;

    Ok(out)
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
