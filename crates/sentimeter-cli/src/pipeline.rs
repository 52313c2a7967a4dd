//! The live fetch → annotate chain behind the reply cache.

use chrono::Utc;
use sentimeter_core::{AppConfig, ReplyRecord, TrackedCompanies};
use sentimeter_fetch::{fetch_all_replies, SearchClient, SearchWindow};
use sentimeter_sentiment::{
    annotate_replies, Categorizer, ChatClient, Classifier, ClassifierSettings, HttpSettings,
    SentimentError,
};
use sentimeter_store::{BoxError, RecordSource};

pub(crate) fn http_settings(config: &AppConfig) -> HttpSettings {
    HttpSettings {
        timeout_secs: config.request_timeout_secs,
        user_agent: config.user_agent.clone(),
        max_retries: config.max_retries,
        backoff_base_ms: config.retry_backoff_base_ms,
    }
}

/// Chat client for the configured LLM endpoint.
///
/// # Errors
///
/// Fails when `GROQ_API_KEY` is unset or the HTTP client cannot be built.
pub(crate) fn chat_client(config: &AppConfig) -> Result<ChatClient, SentimentError> {
    let key = config.llm_api_key.as_deref().unwrap_or_default();
    ChatClient::new(&config.llm_base_url, key, &http_settings(config))
}

pub(crate) struct LivePipeline<'a> {
    config: &'a AppConfig,
    companies: &'a TrackedCompanies,
}

impl<'a> LivePipeline<'a> {
    pub(crate) fn new(config: &'a AppConfig, companies: &'a TrackedCompanies) -> Self {
        Self { config, companies }
    }
}

impl RecordSource for LivePipeline<'_> {
    async fn collect(&self, window_days: u32) -> Result<Vec<ReplyRecord>, BoxError> {
        let config = self.config;
        let Some(api_key) = config.search_api_key.as_deref() else {
            return Err("TWITTERAPI_KEY is not set; cannot fetch replies".into());
        };

        // All clients exist before the first search request.
        let client = SearchClient::with_base_url(
            &config.search_base_url,
            api_key,
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_ms,
        )?;
        let classifier = Classifier::shared(&ClassifierSettings {
            url: config.classifier_url.clone(),
            http: http_settings(config),
        })?;
        let categorizer = Categorizer::new(chat_client(config)?, &config.category_model);

        let window = SearchWindow::trailing(window_days, Utc::now());
        tracing::info!(
            since = %window.since,
            until = %window.until,
            handles = self.companies.handles().len(),
            "fetching replies"
        );
        let replies = fetch_all_replies(&client, self.companies, &window).await?;

        let records = annotate_replies(
            replies,
            classifier,
            &categorizer,
            config.annotate_concurrency,
        )
        .await?;
        tracing::info!(records = records.len(), window_days, "annotation complete");
        Ok(records)
    }
}
