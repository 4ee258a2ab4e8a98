use itinera_core::{AcceptedImage, PlaceQuery, SearchConfig};

use crate::aggregator::aggregate;
use crate::error::ImageError;
use crate::fallback::LlmFallback;
use crate::policy::load_policy_or_default;
use crate::providers::{build_http_client, build_providers, ImageProvider};
use crate::relevance::RelevanceEvaluator;

const DEFAULT_MAX_CONCURRENT_ACTIVITIES: usize = 5;

/// Providers, optional LLM fallback, and the one relevance policy they share.
pub struct ImagePipeline {
    providers: Vec<Box<dyn ImageProvider>>,
    fallback: Option<LlmFallback>,
    evaluator: RelevanceEvaluator,
    pub(crate) max_concurrent_activities: usize,
}

impl ImagePipeline {
    #[must_use]
    pub fn new(
        providers: Vec<Box<dyn ImageProvider>>,
        fallback: Option<LlmFallback>,
        evaluator: RelevanceEvaluator,
    ) -> Self {
        Self {
            providers,
            fallback,
            evaluator,
            max_concurrent_activities: DEFAULT_MAX_CONCURRENT_ACTIVITIES,
        }
    }

    /// Limit how many activities a batch run processes at once (minimum 1).
    #[must_use]
    pub fn with_max_concurrent_activities(mut self, max: usize) -> Self {
        self.max_concurrent_activities = max.max(1);
        self
    }

    /// Build the pipeline described by `config`: every credentialed provider,
    /// the LLM fallback when a key is set, and the configured relevance
    /// policy.
    ///
    /// # Errors
    ///
    /// - [`ImageError::Config`] if the relevance policy file cannot be loaded.
    /// - [`ImageError::Http`] if the HTTP client cannot be built.
    /// - [`ImageError::InvalidBaseUrl`] if a configured endpoint is invalid.
    pub fn from_config(config: &SearchConfig) -> Result<Self, ImageError> {
        let policy = load_policy_or_default(config.relevance_policy_path.as_deref())?;
        let http = build_http_client(&config.user_agent)?;
        let providers = build_providers(&http, config)?;
        let fallback = LlmFallback::from_config(http, config)?;

        tracing::debug!(
            providers = providers.len(),
            fallback = fallback.is_some(),
            "image pipeline configured"
        );

        Ok(Self::new(providers, fallback, RelevanceEvaluator::new(&policy))
            .with_max_concurrent_activities(config.max_concurrent_activities))
    }

    #[must_use]
    pub fn evaluator(&self) -> &RelevanceEvaluator {
        &self.evaluator
    }

    #[must_use]
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Accepted images for one place: the provider fan-out, then the LLM
    /// fallback if that found nothing. Always resolves; an empty list means
    /// no trustworthy image exists.
    pub async fn search(&self, place: &PlaceQuery) -> Vec<AcceptedImage> {
        let images = aggregate(place, &self.providers, &self.evaluator).await;
        if !images.is_empty() {
            return images;
        }

        match &self.fallback {
            Some(fallback) => {
                tracing::debug!(
                    activity = %place.activity_name,
                    "providers found nothing; trying llm fallback"
                );
                fallback.search(place, &self.evaluator).await
            }
            None => images,
        }
    }
}

/// Find images for one place using only the explicit `config`.
///
/// Never fails. A configuration problem is logged and treated like every
/// other provider failure: no images.
pub async fn search_images_for_place(
    place: &PlaceQuery,
    config: &SearchConfig,
) -> Vec<AcceptedImage> {
    match ImagePipeline::from_config(config) {
        Ok(pipeline) => pipeline.search(place).await,
        Err(e) => {
            tracing::error!(
                activity = %place.activity_name,
                error = %e,
                "image pipeline could not be built"
            );
            Vec::new()
        }
    }
}
