use std::time::Duration;

use async_trait::async_trait;
use itinera_core::{ImageCandidate, PlaceQuery, ProviderTag};
use reqwest::Client;
use serde::Deserialize;

use super::http::{fetch_json, normalize_base_url};
use super::{keep_relevant, ImageProvider, PER_PROVIDER_LIMIT, RAW_RESULT_COUNT};
use crate::error::ImageError;
use crate::relevance::RelevanceEvaluator;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    link: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

/// Google Custom Search JSON API in image mode. Needs both an API key and a
/// search engine id (`cx`).
pub struct GoogleImageProvider {
    client: Client,
    api_key: String,
    engine_id: String,
    base_url: String,
    timeout: Duration,
}

impl GoogleImageProvider {
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidBaseUrl`] if the default endpoint fails to parse.
    pub fn new(
        client: Client,
        api_key: &str,
        engine_id: &str,
        timeout: Duration,
    ) -> Result<Self, ImageError> {
        Self::with_base_url(client, api_key, engine_id, timeout, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`ImageError::InvalidBaseUrl`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        client: Client,
        api_key: &str,
        engine_id: &str,
        timeout: Duration,
        base_url: &str,
    ) -> Result<Self, ImageError> {
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            engine_id: engine_id.to_string(),
            base_url: normalize_base_url(base_url)?,
            timeout,
        })
    }
}

#[async_trait]
impl ImageProvider for GoogleImageProvider {
    fn tag(&self) -> ProviderTag {
        ProviderTag::GoogleSearch
    }

    async fn search(
        &self,
        place: &PlaceQuery,
        evaluator: &RelevanceEvaluator,
    ) -> Result<Vec<ImageCandidate>, ImageError> {
        let request = self
            .client
            .get(format!("{}/customsearch/v1", self.base_url))
            .timeout(self.timeout)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", place.activity_name.as_str()),
                ("searchType", "image"),
                ("num", RAW_RESULT_COUNT.to_string().as_str()),
            ]);

        let response: SearchResponse = fetch_json(request, "google customsearch/v1").await?;

        let candidates = response.items.into_iter().filter_map(|item| {
            ImageCandidate::new(
                item.link?,
                item.title,
                item.snippet,
                ProviderTag::GoogleSearch,
            )
        });

        Ok(keep_relevant(candidates, place, evaluator, PER_PROVIDER_LIMIT))
    }
}
