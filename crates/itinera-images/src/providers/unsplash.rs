use std::time::Duration;

use async_trait::async_trait;
use itinera_core::{ImageCandidate, PlaceQuery, ProviderTag};
use reqwest::Client;
use serde::Deserialize;

use super::http::{fetch_json, normalize_base_url};
use super::{first_non_blank, keep_relevant, ImageProvider, PER_PROVIDER_LIMIT, RAW_RESULT_COUNT};
use crate::error::ImageError;
use crate::relevance::RelevanceEvaluator;

const DEFAULT_BASE_URL: &str = "https://api.unsplash.com";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    #[serde(default)]
    urls: PhotoUrls,
    description: Option<String>,
    alt_description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PhotoUrls {
    regular: Option<String>,
    small: Option<String>,
}

/// Unsplash photo search.
pub struct UnsplashProvider {
    client: Client,
    access_key: String,
    base_url: String,
    timeout: Duration,
}

impl UnsplashProvider {
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidBaseUrl`] if the default endpoint fails to parse.
    pub fn new(client: Client, access_key: &str, timeout: Duration) -> Result<Self, ImageError> {
        Self::with_base_url(client, access_key, timeout, DEFAULT_BASE_URL)
    }

    /// Creates a provider with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidBaseUrl`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        client: Client,
        access_key: &str,
        timeout: Duration,
        base_url: &str,
    ) -> Result<Self, ImageError> {
        Ok(Self {
            client,
            access_key: access_key.to_string(),
            base_url: normalize_base_url(base_url)?,
            timeout,
        })
    }
}

#[async_trait]
impl ImageProvider for UnsplashProvider {
    fn tag(&self) -> ProviderTag {
        ProviderTag::Unsplash
    }

    async fn search(
        &self,
        place: &PlaceQuery,
        evaluator: &RelevanceEvaluator,
    ) -> Result<Vec<ImageCandidate>, ImageError> {
        // Locality is left out of the query; it dilutes stock-photo relevance.
        let request = self
            .client
            .get(format!("{}/search/photos", self.base_url))
            .timeout(self.timeout)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Client-ID {}", self.access_key),
            )
            .query(&[
                ("query", place.activity_name.as_str()),
                ("per_page", RAW_RESULT_COUNT.to_string().as_str()),
                ("orientation", "landscape"),
                ("order_by", "relevance"),
            ]);

        let response: SearchResponse = fetch_json(request, "unsplash search/photos").await?;

        let candidates = response.results.into_iter().filter_map(|photo| {
            let url = photo.urls.regular.or(photo.urls.small)?;
            let description = photo.description.as_deref();
            let alt = photo.alt_description.as_deref();
            ImageCandidate::new(
                url,
                first_non_blank(&[alt, description]),
                first_non_blank(&[description, alt]),
                ProviderTag::Unsplash,
            )
        });

        Ok(keep_relevant(candidates, place, evaluator, PER_PROVIDER_LIMIT))
    }
}
