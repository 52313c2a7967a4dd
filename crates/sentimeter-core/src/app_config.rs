use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// YAML file listing tracked companies. `None` uses the built-in set.
    pub companies_path: Option<PathBuf>,
    pub cache_dir: PathBuf,
    pub cache_max_age_secs: u64,
    pub search_api_key: Option<String>,
    pub search_base_url: String,
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub category_model: String,
    pub report_model: String,
    /// TEI endpoint serving the sentiment classification model.
    pub classifier_url: Option<String>,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub annotate_concurrency: usize,
    pub user_agent: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("companies_path", &self.companies_path)
            .field("cache_dir", &self.cache_dir)
            .field("cache_max_age_secs", &self.cache_max_age_secs)
            .field(
                "search_api_key",
                &self.search_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("search_base_url", &self.search_base_url)
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_base_url", &self.llm_base_url)
            .field("category_model", &self.category_model)
            .field("report_model", &self.report_model)
            .field("classifier_url", &self.classifier_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("annotate_concurrency", &self.annotate_concurrency)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
