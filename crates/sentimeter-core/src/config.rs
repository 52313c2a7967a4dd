use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup. API keys are optional here: they are only needed once a
/// command actually has to reach the search API or the language model.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("SENTIMETER_ENV", "development"))?;
    let log_level = or_default("SENTIMETER_LOG_LEVEL", "info");
    let companies_path = optional("SENTIMETER_COMPANIES_PATH").map(PathBuf::from);
    let cache_dir = PathBuf::from(or_default("SENTIMETER_CACHE_DIR", "./cache"));
    let cache_max_age_secs = parse_u64("SENTIMETER_CACHE_MAX_AGE_SECS", "86400")?;

    let search_api_key = optional("TWITTERAPI_KEY");
    let search_base_url = or_default("SENTIMETER_SEARCH_BASE_URL", "https://api.twitterapi.io");
    let llm_api_key = optional("GROQ_API_KEY");
    let llm_base_url = or_default(
        "SENTIMETER_LLM_BASE_URL",
        "https://api.groq.com/openai/v1",
    );
    let category_model = or_default("SENTIMETER_CATEGORY_MODEL", "llama3-70b-8192");
    let report_model = or_default("SENTIMETER_REPORT_MODEL", "llama-3.3-70b-versatile");
    let classifier_url = optional("SENTIMETER_CLASSIFIER_URL");

    let request_timeout_secs = parse_u64("SENTIMETER_REQUEST_TIMEOUT_SECS", "30")?;
    let max_retries = parse_u32("SENTIMETER_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("SENTIMETER_RETRY_BACKOFF_BASE_MS", "1000")?;
    let annotate_concurrency = parse_usize("SENTIMETER_ANNOTATE_CONCURRENCY", "4")?;
    if annotate_concurrency == 0 {
        return Err(invalid(
            "SENTIMETER_ANNOTATE_CONCURRENCY",
            "must be at least 1".to_string(),
        ));
    }
    let user_agent = or_default(
        "SENTIMETER_USER_AGENT",
        "sentimeter/0.1 (reply-monitoring)",
    );

    Ok(AppConfig {
        env,
        log_level,
        companies_path,
        cache_dir,
        cache_max_age_secs,
        search_api_key,
        search_base_url,
        llm_api_key,
        llm_base_url,
        category_model,
        report_model,
        classifier_url,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        annotate_concurrency,
        user_agent,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SENTIMETER_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
