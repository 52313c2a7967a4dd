//! Per-invocation state shared by the command handlers.

use std::time::Duration;

use anyhow::Context;
use sentimeter_core::{AppConfig, ReplyRecord, TrackedCompanies};
use sentimeter_metrics::{select_company, RecordFilter};
use sentimeter_store::ReplyCache;

use crate::pipeline::LivePipeline;
use crate::ScopeArgs;

pub(crate) struct AppContext {
    pub config: AppConfig,
    pub companies: TrackedCompanies,
    pub cache: ReplyCache,
}

/// Records narrowed to what a command should look at.
pub(crate) struct Selection {
    pub records: Vec<ReplyRecord>,
    /// Company the views focus on, `None` for all companies.
    pub focus: Option<String>,
}

impl AppContext {
    /// Load the tracked-company list and the cache handle for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the companies file is unreadable or invalid.
    pub(crate) fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let companies = match &config.companies_path {
            Some(path) => sentimeter_core::load_companies(path)
                .with_context(|| format!("failed to load companies from {}", path.display()))?,
            None => TrackedCompanies::builtin(),
        };
        let cache = ReplyCache::new(
            config.cache_dir.clone(),
            Duration::from_secs(config.cache_max_age_secs),
            &companies.fingerprint(),
        );
        Ok(Self {
            config,
            companies,
            cache,
        })
    }

    /// Annotated replies for a `days` window, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is cached and the live pipeline fails.
    pub(crate) async fn load_records(
        &self,
        days: u32,
        refresh: bool,
    ) -> anyhow::Result<Vec<ReplyRecord>> {
        let pipeline = LivePipeline::new(&self.config, &self.companies);
        let records = if refresh {
            self.cache.refresh(days, &pipeline).await
        } else {
            self.cache.load_or_fetch(days, &pipeline).await
        };
        records.with_context(|| format!("failed to obtain replies for the {days}-day window"))
    }

    /// Load the window, then apply the company focus and the scope filters.
    ///
    /// # Errors
    ///
    /// Propagates [`AppContext::load_records`] failures.
    pub(crate) async fn select(&self, scope: &ScopeArgs) -> anyhow::Result<Selection> {
        let all = self.load_records(scope.days, scope.refresh).await?;
        Ok(self.narrow(&all, scope))
    }

    /// Apply the company focus, then the date and category filters.
    /// Window records for cross-company views: date and category bounds
    /// apply, the company focus does not.
    pub(crate) fn comparison_records(all: &[ReplyRecord], scope: &ScopeArgs) -> Vec<ReplyRecord> {
        scope_filter(scope).apply(all)
    }

    pub(crate) fn narrow(&self, all: &[ReplyRecord], scope: &ScopeArgs) -> Selection {
        let company = scope
            .company
            .as_deref()
            .map(|c| self.companies.canonical_name(c).unwrap_or(c));

        let selection = select_company(all, company);
        if selection.fell_back {
            println!(
                "no replies for '{}'; showing all companies instead",
                company.unwrap_or_default()
            );
        }
        let focus = company
            .filter(|_| !selection.fell_back)
            .map(str::to_owned);

        Selection {
            records: scope_filter(scope).apply(&selection.records),
            focus,
        }
    }

    pub(crate) async fn run_fetch(&self, days: u32, refresh: bool) -> anyhow::Result<()> {
        let records = self.load_records(days, refresh).await?;
        println!(
            "{} replies available for the {days}-day window ({})",
            records.len(),
            self.cache.path_for(days).display()
        );
        Ok(())
    }
}

/// Date and category bounds from the command line.
fn scope_filter(scope: &ScopeArgs) -> RecordFilter {
    RecordFilter {
        from: scope.from,
        to: scope.to,
        categories: scope.category.clone(),
        ..RecordFilter::default()
    }
}
