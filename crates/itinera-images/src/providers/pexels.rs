use std::time::Duration;

use async_trait::async_trait;
use itinera_core::{ImageCandidate, PlaceQuery, ProviderTag};
use reqwest::Client;
use serde::Deserialize;

use super::http::{fetch_json, normalize_base_url};
use super::{keep_relevant, ImageProvider, PER_PROVIDER_LIMIT, RAW_RESULT_COUNT};
use crate::error::ImageError;
use crate::relevance::RelevanceEvaluator;

const DEFAULT_BASE_URL: &str = "https://api.pexels.com";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    #[serde(default)]
    src: PhotoSources,
    alt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PhotoSources {
    large: Option<String>,
    medium: Option<String>,
}

/// Pexels photo search. The API key goes in `Authorization` without a scheme.
pub struct PexelsProvider {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl PexelsProvider {
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
impl ImageProvider for PexelsProvider {
    fn tag(&self) -> ProviderTag {
        ProviderTag::Pexels
    }

    async fn search(
        &self,
        place: &PlaceQuery,
        evaluator: &RelevanceEvaluator,
    ) -> Result<Vec<ImageCandidate>, ImageError> {
        let request = self
            .client
            .get(format!("{}/v1/search", self.base_url))
            .timeout(self.timeout)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .query(&[
                ("query", place.activity_name.as_str()),
                ("per_page", RAW_RESULT_COUNT.to_string().as_str()),
                ("orientation", "landscape"),
            ]);

        let response: SearchResponse = fetch_json(request, "pexels v1/search").await?;

        let candidates = response.photos.into_iter().filter_map(|photo| {
            let url = photo.src.large.or(photo.src.medium)?;
            let alt = photo.alt.unwrap_or_default();
            ImageCandidate::new(url, alt.clone(), alt, ProviderTag::Pexels)
        });

        Ok(keep_relevant(candidates, place, evaluator, PER_PROVIDER_LIMIT))
    }
}
