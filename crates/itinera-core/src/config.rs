use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does not load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional. Credentials set to an empty string are treated
/// as unset so a blank line in `.env` never enables a provider. Wikipedia
/// language codes are the exception: a blank value disables that language.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

    // Set-but-blank is kept as blank so a language can be switched off.
    let or_default_keep_blank = |var: &str, default: &str| -> String {
        lookup(var).map_or_else(|_| default.to_string(), |v| v.trim().to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

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

    let env = parse_environment(&or_default("ITINERA_ENV", "development"))?;
    let log_level = or_default("ITINERA_LOG_LEVEL", "info");
    let database_url = optional("DATABASE_URL");

    let db_max_connections = parse_u32("ITINERA_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("ITINERA_DB_MIN_CONNECTIONS", "1")?;
    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "ITINERA_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "must not exceed ITINERA_DB_MAX_CONNECTIONS ({db_max_connections})"
            ),
        });
    }
    let db_acquire_timeout_secs = parse_u64("ITINERA_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let user_agent = or_default("ITINERA_USER_AGENT", "itinera/0.1 (travel-planner)");
    let search_timeout_secs = parse_u64("ITINERA_SEARCH_TIMEOUT_SECS", "5")?;
    let page_timeout_secs = parse_u64("ITINERA_PAGE_TIMEOUT_SECS", "8")?;
    let file_timeout_secs = parse_u64("ITINERA_FILE_TIMEOUT_SECS", "3")?;
    let llm_timeout_secs = parse_u64("ITINERA_LLM_TIMEOUT_SECS", "60")?;
    let max_concurrent_activities = parse_usize("ITINERA_MAX_CONCURRENT_ACTIVITIES", "5")?.max(1);

    let wikipedia_primary_lang = or_default_keep_blank("ITINERA_WIKIPEDIA_PRIMARY_LANG", "zh");
    let wikipedia_secondary_lang = or_default_keep_blank("ITINERA_WIKIPEDIA_SECONDARY_LANG", "en");
    let relevance_policy_path = optional("ITINERA_RELEVANCE_POLICY_PATH").map(PathBuf::from);

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        user_agent,
        search_timeout_secs,
        page_timeout_secs,
        file_timeout_secs,
        llm_timeout_secs,
        max_concurrent_activities,
        wikipedia_primary_lang,
        wikipedia_secondary_lang,
        relevance_policy_path,
        unsplash_access_key: optional("UNSPLASH_ACCESS_KEY"),
        pexels_api_key: optional("PEXELS_API_KEY"),
        google_api_key: optional("GOOGLE_API_KEY"),
        google_search_engine_id: optional("GOOGLE_SEARCH_ENGINE_ID"),
        bing_api_key: optional("BING_API_KEY"),
        llm_api_key: optional("LLM_API_KEY"),
        llm_api_url: optional("LLM_API_URL"),
        llm_model: or_default("LLM_MODEL", "qwen-plus"),
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ITINERA_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
