//! Image provider adapters.
//!
//! Each adapter wraps one external HTTP API and projects its response into
//! [`ImageCandidate`]s, already screened by the relevance evaluator and capped
//! at [`PER_PROVIDER_LIMIT`]. Adapters return `Result`; [`search_isolated`]
//! turns every failure (including a panic) into an empty list so one provider
//! never aborts the others.

mod bing;
mod google;
pub(crate) mod http;
mod pexels;
mod unsplash;
mod wikipedia;

use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;
use itinera_core::{ImageCandidate, PlaceQuery, ProviderTag, SearchConfig};
use reqwest::Client;

use crate::error::ImageError;
use crate::relevance::{CandidateText, RelevanceEvaluator};

pub use bing::BingImageProvider;
pub use google::GoogleImageProvider;
pub use http::build_http_client;
pub use pexels::PexelsProvider;
pub use unsplash::UnsplashProvider;
pub use wikipedia::WikipediaProvider;

/// Most candidates any single provider contributes per place.
pub const PER_PROVIDER_LIMIT: usize = 3;

/// Raw results requested from keyword-search APIs before filtering.
pub(crate) const RAW_RESULT_COUNT: u32 = 10;

#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn tag(&self) -> ProviderTag;

    /// Search for photographs of `place`.
    ///
    /// Implementations return only candidates the evaluator accepts, at most
    /// [`PER_PROVIDER_LIMIT`] of them.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError`] on network, status, or payload failures.
    async fn search(
        &self,
        place: &PlaceQuery,
        evaluator: &RelevanceEvaluator,
    ) -> Result<Vec<ImageCandidate>, ImageError>;
}

/// Run one provider, logging and swallowing any failure.
pub async fn search_isolated(
    provider: &dyn ImageProvider,
    place: &PlaceQuery,
    evaluator: &RelevanceEvaluator,
) -> Vec<ImageCandidate> {
    let tag = provider.tag();
    match AssertUnwindSafe(provider.search(place, evaluator))
        .catch_unwind()
        .await
    {
        Ok(Ok(candidates)) => {
            tracing::debug!(
                provider = %tag,
                activity = %place.activity_name,
                count = candidates.len(),
                "collected image candidates"
            );
            candidates
        }
        Ok(Err(e)) => {
            tracing::warn!(
                provider = %tag,
                activity = %place.activity_name,
                error = %e,
                "image provider failed"
            );
            Vec::new()
        }
        Err(_) => {
            tracing::warn!(
                provider = %tag,
                activity = %place.activity_name,
                "image provider panicked"
            );
            Vec::new()
        }
    }
}

/// Build every provider whose credentials are configured, in fixed priority
/// order: encyclopedia, stock photos, generic search.
///
/// Providers without credentials are left out, so they cost no network call.
///
/// # Errors
///
/// Returns [`ImageError::InvalidBaseUrl`] if a built-in endpoint fails to
/// parse.
pub fn build_providers(
    client: &Client,
    config: &SearchConfig,
) -> Result<Vec<Box<dyn ImageProvider>>, ImageError> {
    let creds = &config.credentials;
    let mut providers: Vec<Box<dyn ImageProvider>> = Vec::new();

    if wikipedia::configured_languages(config).is_empty() {
        tracing::debug!(provider = "wikipedia", "no language editions; provider disabled");
    } else {
        providers.push(Box::new(WikipediaProvider::new(client.clone(), config)?));
    }

    match creds.unsplash_access_key.as_deref() {
        Some(key) => providers.push(Box::new(UnsplashProvider::new(
            client.clone(),
            key,
            config.timeouts.search,
        )?)),
        None => tracing::debug!(provider = "unsplash", "no credentials; provider disabled"),
    }

    match creds.pexels_api_key.as_deref() {
        Some(key) => providers.push(Box::new(PexelsProvider::new(
            client.clone(),
            key,
            config.timeouts.search,
        )?)),
        None => tracing::debug!(provider = "pexels", "no credentials; provider disabled"),
    }

    match (
        creds.google_api_key.as_deref(),
        creds.google_search_engine_id.as_deref(),
    ) {
        (Some(key), Some(cx)) => providers.push(Box::new(GoogleImageProvider::new(
            client.clone(),
            key,
            cx,
            config.timeouts.search,
        )?)),
        _ => tracing::debug!(provider = "google_search", "no credentials; provider disabled"),
    }

    match creds.bing_api_key.as_deref() {
        Some(key) => providers.push(Box::new(BingImageProvider::new(
            client.clone(),
            key,
            config.timeouts.search,
        )?)),
        None => tracing::debug!(provider = "bing_search", "no credentials; provider disabled"),
    }

    Ok(providers)
}

/// Keep the first `limit` candidates the evaluator accepts.
pub(crate) fn keep_relevant(
    candidates: impl IntoIterator<Item = ImageCandidate>,
    place: &PlaceQuery,
    evaluator: &RelevanceEvaluator,
    limit: usize,
) -> Vec<ImageCandidate> {
    candidates
        .into_iter()
        .filter(|candidate| {
            let verdict = evaluator.evaluate(CandidateText::from(candidate), place);
            if let Some(reason) = &verdict.rejection {
                tracing::trace!(
                    provider = %candidate.source,
                    url = %candidate.url,
                    reason = %reason,
                    "candidate rejected"
                );
            }
            verdict.accepted
        })
        .take(limit)
        .collect()
}

/// First non-blank string among `options`, or `""`.
pub(crate) fn first_non_blank<'a>(options: &[Option<&'a str>]) -> &'a str {
    options
        .iter()
        .flatten()
        .copied()
        .find(|s| !s.trim().is_empty())
        .unwrap_or("")
}
