//! Shared domain types and configuration for the itinera image pipeline.

mod app_config;
mod config;
mod itinerary;
mod place;
mod search_config;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use itinerary::{ActivityLocation, DayPlan, Itinerary, ItineraryActivity};
pub use place::{AcceptedImage, ImageCandidate, PlaceQuery, ProviderTag};
pub use search_config::{Credentials, SearchConfig, SearchTimeouts};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read relevance policy file {path}: {source}")]
    PolicyFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse relevance policy file: {0}")]
    PolicyFileParse(#[from] serde_yaml::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
