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
    pub database_url: Option<String>,
    pub env: Environment,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub user_agent: String,
    pub search_timeout_secs: u64,
    pub page_timeout_secs: u64,
    pub file_timeout_secs: u64,
    pub llm_timeout_secs: u64,
    pub max_concurrent_activities: usize,
    pub wikipedia_primary_lang: String,
    pub wikipedia_secondary_lang: String,
    pub relevance_policy_path: Option<PathBuf>,
    pub unsplash_access_key: Option<String>,
    pub pexels_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub google_search_engine_id: Option<String>,
    pub bing_api_key: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_api_url: Option<String>,
    pub llm_model: String,
}

fn redact(value: Option<&String>) -> Option<&'static str> {
    value.map(|_| "[redacted]")
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &redact(self.database_url.as_ref()))
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("search_timeout_secs", &self.search_timeout_secs)
            .field("page_timeout_secs", &self.page_timeout_secs)
            .field("file_timeout_secs", &self.file_timeout_secs)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("max_concurrent_activities", &self.max_concurrent_activities)
            .field("wikipedia_primary_lang", &self.wikipedia_primary_lang)
            .field("wikipedia_secondary_lang", &self.wikipedia_secondary_lang)
            .field("relevance_policy_path", &self.relevance_policy_path)
            .field(
                "unsplash_access_key",
                &redact(self.unsplash_access_key.as_ref()),
            )
            .field("pexels_api_key", &redact(self.pexels_api_key.as_ref()))
            .field("google_api_key", &redact(self.google_api_key.as_ref()))
            .field("google_search_engine_id", &self.google_search_engine_id)
            .field("bing_api_key", &redact(self.bing_api_key.as_ref()))
            .field("llm_api_key", &redact(self.llm_api_key.as_ref()))
            .field("llm_api_url", &self.llm_api_url)
            .field("llm_model", &self.llm_model)
            .finish()
    }
}
