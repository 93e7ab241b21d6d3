use crate::app_config::{AppConfig, RedditCredentials};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_config_from_env() -> Result<AppConfig, ConfigError> {
    build_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup — no
/// `set_var`/`remove_var` needed.
fn build_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_string()) };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let newsapi_api_key = require("TRENDLENS_NEWSAPI_API_KEY")?;
    let newsapi_language = or_default("TRENDLENS_NEWSAPI_LANGUAGE", "en");

    // Reddit is opt-in: register the source only when all credentials are set.
    let reddit = match (
        lookup("TRENDLENS_REDDIT_CLIENT_ID").ok(),
        lookup("TRENDLENS_REDDIT_CLIENT_SECRET").ok(),
    ) {
        (Some(client_id), Some(client_secret)) => Some(RedditCredentials {
            client_id,
            client_secret,
            user_agent: or_default("TRENDLENS_REDDIT_USER_AGENT", "trendlens/0.1 (mention-stats)"),
        }),
        _ => None,
    };

    let wikipedia_project = or_default("TRENDLENS_WIKIPEDIA_PROJECT", "en.wikipedia");
    let wikipedia_access = or_default("TRENDLENS_WIKIPEDIA_ACCESS", "all-access");
    let wikipedia_agent = or_default("TRENDLENS_WIKIPEDIA_AGENT", "user");

    let log_level = or_default("TRENDLENS_LOG_LEVEL", "info");
    let http_user_agent = or_default("TRENDLENS_HTTP_USER_AGENT", "trendlens/0.1 (mention-stats)");
    let request_timeout_secs = parse_u64("TRENDLENS_REQUEST_TIMEOUT_SECS", "30")?;
    let cache_ttl_secs = parse_u64("TRENDLENS_CACHE_TTL_SECS", "3600")?;
    let cache_capacity = parse_u64("TRENDLENS_CACHE_CAPACITY", "1024")?;
    let history_limit = parse_usize("TRENDLENS_HISTORY_LIMIT", "1000")?;

    Ok(AppConfig {
        log_level,
        newsapi_api_key,
        newsapi_language,
        reddit,
        wikipedia_project,
        wikipedia_access,
        wikipedia_agent,
        http_user_agent,
        request_timeout_secs,
        cache_ttl_secs,
        cache_capacity,
        history_limit,
    })
}
