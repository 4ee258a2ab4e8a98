//! Multi-source image search and relevance filtering for itinerary stops.
//!
//! [`ImagePipeline::search`] fans out to every configured provider, keeps
//! only images the [`RelevanceEvaluator`] accepts, and falls back to an LLM
//! only when the providers find nothing. [`ImagePipeline::process_itinerary`]
//! runs that search for a whole plan and persists the results.

pub mod aggregator;
pub mod completion;
pub mod error;
pub mod fallback;
pub mod orchestrator;
pub mod pipeline;
pub mod policy;
pub mod providers;
pub mod relevance;
pub mod store;

pub use aggregator::{aggregate, MAX_ACCEPTED_IMAGES};
pub use completion::{resolve_completion_url, CompletionClient};
pub use error::ImageError;
pub use fallback::LlmFallback;
pub use orchestrator::{spawn_itinerary, ItinerarySummary};
pub use pipeline::{search_images_for_place, ImagePipeline};
pub use policy::{load_policy, load_policy_or_default, ExclusionRule, RelevancePolicy};
pub use providers::{
    build_http_client, build_providers, search_isolated, BingImageProvider, GoogleImageProvider,
    ImageProvider, PexelsProvider, UnsplashProvider, WikipediaProvider, PER_PROVIDER_LIMIT,
};
pub use relevance::{CandidateText, KeywordMode, Rejection, RelevanceEvaluator, RelevanceVerdict};
pub use store::{ImageStore, PgImageStore};
