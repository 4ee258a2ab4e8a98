use std::path::PathBuf;
use std::time::Duration;

use crate::app_config::AppConfig;

/// API credentials for every optional image source.
///
/// A provider whose credential is `None` is skipped without a network call.
#[derive(Clone, Default)]
pub struct Credentials {
    pub unsplash_access_key: Option<String>,
    pub pexels_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub google_search_engine_id: Option<String>,
    pub bing_api_key: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_api_url: Option<String>,
    pub llm_model: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set = |v: &Option<String>| if v.is_some() { "[set]" } else { "[unset]" };
        f.debug_struct("Credentials")
            .field("unsplash_access_key", &set(&self.unsplash_access_key))
            .field("pexels_api_key", &set(&self.pexels_api_key))
            .field("google_api_key", &set(&self.google_api_key))
            .field("google_search_engine_id", &self.google_search_engine_id)
            .field("bing_api_key", &set(&self.bing_api_key))
            .field("llm_api_key", &set(&self.llm_api_key))
            .field("llm_api_url", &self.llm_api_url)
            .field("llm_model", &self.llm_model)
            .finish()
    }
}

/// Per-call timeouts. A timeout empties one provider stage, never the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTimeouts {
    pub search: Duration,
    pub page: Duration,
    pub file: Duration,
    pub llm: Duration,
}

impl Default for SearchTimeouts {
    fn default() -> Self {
        Self {
            search: Duration::from_secs(5),
            page: Duration::from_secs(8),
            file: Duration::from_secs(3),
            llm: Duration::from_secs(60),
        }
    }
}

/// Everything the image pipeline needs, passed explicitly to each entry point.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub credentials: Credentials,
    pub timeouts: SearchTimeouts,
    pub user_agent: String,
    pub max_concurrent_activities: usize,
    pub wikipedia_primary_lang: String,
    pub wikipedia_secondary_lang: String,
    pub relevance_policy_path: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            timeouts: SearchTimeouts::default(),
            user_agent: "itinera/0.1 (travel-planner)".to_string(),
            max_concurrent_activities: 5,
            wikipedia_primary_lang: "zh".to_string(),
            wikipedia_secondary_lang: "en".to_string(),
            relevance_policy_path: None,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            credentials: Credentials {
                unsplash_access_key: config.unsplash_access_key.clone(),
                pexels_api_key: config.pexels_api_key.clone(),
                google_api_key: config.google_api_key.clone(),
                google_search_engine_id: config.google_search_engine_id.clone(),
                bing_api_key: config.bing_api_key.clone(),
                llm_api_key: config.llm_api_key.clone(),
                llm_api_url: config.llm_api_url.clone(),
                llm_model: Some(config.llm_model.clone()),
            },
            timeouts: SearchTimeouts {
                search: Duration::from_secs(config.search_timeout_secs),
                page: Duration::from_secs(config.page_timeout_secs),
                file: Duration::from_secs(config.file_timeout_secs),
                llm: Duration::from_secs(config.llm_timeout_secs),
            },
            user_agent: config.user_agent.clone(),
            max_concurrent_activities: config.max_concurrent_activities.max(1),
            wikipedia_primary_lang: config.wikipedia_primary_lang.clone(),
            wikipedia_secondary_lang: config.wikipedia_secondary_lang.clone(),
            relevance_policy_path: config.relevance_policy_path.clone(),
        }
    }
}
