use std::time::Duration;

use async_trait::async_trait;
use itinera_core::{ImageCandidate, PlaceQuery, ProviderTag};
use reqwest::Client;
use serde::Deserialize;

use super::http::{fetch_json, normalize_base_url};
use super::{keep_relevant, ImageProvider, PER_PROVIDER_LIMIT, RAW_RESULT_COUNT};
use crate::error::ImageError;
use crate::relevance::RelevanceEvaluator;

const DEFAULT_BASE_URL: &str = "https://api.bing.microsoft.com";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<Image>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Image {
    content_url: Option<String>,
    #[serde(default)]
    name: String,
}

/// Bing Image Search v7.
pub struct BingImageProvider {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl BingImageProvider {
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidBaseUrl`] if the default endpoint fails to parse.
    pub fn new(client: Client, api_key: &str, timeout: Duration) -> Result<Self, ImageError> {
        Self::with_base_url(client, api_key, timeout, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`ImageError::InvalidBaseUrl`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        client: Client,
        api_key: &str,
        timeout: Duration,
        base_url: &str,
    ) -> Result<Self, ImageError> {
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: normalize_base_url(base_url)?,
            timeout,
        })
    }
}

#[async_trait]
impl ImageProvider for BingImageProvider {
    fn tag(&self) -> ProviderTag {
        ProviderTag::BingSearch
    }

    async fn search(
        &self,
        place: &PlaceQuery,
        evaluator: &RelevanceEvaluator,
    ) -> Result<Vec<ImageCandidate>, ImageError> {
        let request = self
            .client
            .get(format!("{}/v7.0/images/search", self.base_url))
            .timeout(self.timeout)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .query(&[
                ("q", place.activity_name.as_str()),
                ("count", RAW_RESULT_COUNT.to_string().as_str()),
            ]);

        let response: SearchResponse = fetch_json(request, "bing v7.0/images/search").await?;

        let candidates = response.value.into_iter().filter_map(|image| {
            ImageCandidate::new(
                image.content_url?,
                image.name,
                String::new(),
                ProviderTag::BingSearch,
            )
        });

        Ok(keep_relevant(candidates, place, evaluator, PER_PROVIDER_LIMIT))
    }
}
