use thiserror::Error;

/// Errors raised inside the image pipeline.
///
/// None of these escape `search_images_for_place`: provider and completion
/// failures are logged and mapped to an empty result. Only
/// [`ImageError::Store`] propagates out of a single activity in the batch
/// orchestrator, where it is counted as a failed activity.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not match the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A provider answered with a non-success HTTP status.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The completion service answered without usable content.
    #[error("completion error: {0}")]
    Completion(String),

    #[error("image store error: {0}")]
    Store(#[from] itinera_db::DbError),

    /// The relevance policy file could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] itinera_core::ConfigError),
}
