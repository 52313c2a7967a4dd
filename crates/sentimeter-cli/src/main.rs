mod cache;
mod context;
mod pipeline;
mod report;
mod views;

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use sentimeter_core::{Category, Sentiment};
use sentimeter_metrics::Granularity;
use tracing_subscriber::EnvFilter;

use crate::context::AppContext;

#[derive(Debug, Parser)]
#[command(name = "sentimeter")]
#[command(about = "Reply sentiment monitoring for tracked payment companies")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch and annotate replies for a window, populating the cache
    Fetch {
        /// Lookback window in days
        #[arg(long, default_value_t = 30)]
        days: u32,

        /// Ignore a fresh cache entry and fetch again
        #[arg(long)]
        refresh: bool,
    },
    /// Show sentiment views for all companies or one company
    Analyze {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Trend bucket size: daily, weekly or monthly
        #[arg(long, default_value = "daily")]
        granularity: Granularity,
    },
    /// Compare tracked companies side by side
    Compare {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Trend bucket size: daily, weekly or monthly
        #[arg(long, default_value = "weekly")]
        granularity: Granularity,
    },
    /// Write the filtered record set to a CSV file
    Export {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Keep only these sentiments (repeatable)
        #[arg(long, value_parser = parse_sentiment)]
        sentiment: Vec<Sentiment>,

        /// Keep only these companies (repeatable)
        #[arg(long)]
        source: Vec<String>,

        /// Destination file
        #[arg(long, short, default_value = "replies_export.csv")]
        output: PathBuf,
    },
    /// Generate a Markdown summary report
    Report {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Destination file
        #[arg(long, short, default_value = "sentiment_report.md")]
        output: PathBuf,

        /// Skip the model-written improvement narrative
        #[arg(long)]
        no_llm: bool,
    },
    /// Inspect the reply cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Debug, Subcommand)]
enum CacheCommands {
    /// List cache entries with their age and freshness
    Status,
}

/// Record selection shared by the read commands.
#[derive(Debug, Clone, Args)]
struct ScopeArgs {
    /// Lookback window in days
    #[arg(long, default_value_t = 30)]
    days: u32,

    /// Focus on one company (canonical name)
    #[arg(long)]
    company: Option<String>,

    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Keep only these categories (repeatable)
    #[arg(long, value_parser = parse_category)]
    category: Vec<Category>,

    /// Ignore a fresh cache entry and fetch again
    #[arg(long)]
    refresh: bool,
}

fn parse_sentiment(raw: &str) -> Result<Sentiment, String> {
    Sentiment::parse(raw)
        .ok_or_else(|| format!("unknown sentiment '{raw}' (expected positive, neutral or negative)"))
}

fn parse_category(raw: &str) -> Result<Category, String> {
    Category::parse(raw.trim()).ok_or_else(|| {
        let known: Vec<&str> = Category::KNOWN
            .iter()
            .chain(std::iter::once(&Category::Unclassified))
            .map(|c| c.as_str())
            .collect();
        format!("unknown category '{raw}' (expected one of {})", known.join(", "))
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("sentimeter: no command given; try `sentimeter --help`");
        return Ok(());
    };

    let config = sentimeter_core::load_app_config().context("failed to load configuration")?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(config = ?config, "configuration loaded");
    let ctx = AppContext::from_config(config)?;

    match command {
        Commands::Fetch { days, refresh } => ctx.run_fetch(days, refresh).await,
        Commands::Analyze { scope, granularity } => views::run_analyze(&ctx, &scope, granularity).await,
        Commands::Compare { scope, granularity } => views::run_compare(&ctx, &scope, granularity).await,
        Commands::Export {
            scope,
            sentiment,
            source,
            output,
        } => views::run_export(&ctx, &scope, sentiment, source, &output).await,
        Commands::Report {
            scope,
            output,
            no_llm,
        } => report::run_report(&ctx, &scope, &output, no_llm).await,
        Commands::Cache {
            command: CacheCommands::Status,
        } => cache::run_cache_status(&ctx),
    }
}
