//! Last-resort image search through a text-completion model.
//!
//! The model does not fetch anything; it proposes URLs from what it knows.
//! Every proposal goes through the relevance evaluator in
//! [`KeywordMode::Strict`] before it is accepted.

use std::collections::HashSet;
use std::fmt::Write as _;

use itinera_core::{AcceptedImage, ImageCandidate, PlaceQuery, ProviderTag, SearchConfig};
use reqwest::Client;
use serde_json::Value;

use crate::aggregator::MAX_ACCEPTED_IMAGES;
use crate::completion::CompletionClient;
use crate::error::ImageError;
use crate::relevance::{CandidateText, KeywordMode, RelevanceEvaluator};

#[derive(Debug)]
pub struct LlmFallback {
    client: CompletionClient,
}

impl LlmFallback {
    #[must_use]
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }

    /// Fallback built from configured credentials, or `None` when no LLM API
    /// key is set.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidBaseUrl`] if the configured endpoint is
    /// not a valid URL.
    pub fn from_config(http: Client, config: &SearchConfig) -> Result<Option<Self>, ImageError> {
        let creds = &config.credentials;
        let Some(api_key) = creds.llm_api_key.as_deref() else {
            return Ok(None);
        };
        let client = CompletionClient::new(
            http,
            api_key,
            creds.llm_api_url.as_deref(),
            creds.llm_model.as_deref(),
            config.timeouts.llm,
        )?;
        Ok(Some(Self::new(client)))
    }

    /// Ask the model for images of `place`. Never fails: transport errors,
    /// unparseable output, and rejected proposals all yield an empty list.
    pub async fn search(
        &self,
        place: &PlaceQuery,
        evaluator: &RelevanceEvaluator,
    ) -> Vec<AcceptedImage> {
        let content = match self.client.complete(&build_prompt(place)).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    activity = %place.activity_name,
                    model = %self.client.model(),
                    error = %e,
                    "llm image search failed"
                );
                return Vec::new();
            }
        };

        let Some(entries) = extract_entries(&content) else {
            tracing::warn!(
                activity = %place.activity_name,
                "llm response contained no JSON image list"
            );
            return Vec::new();
        };
        let proposed = entries.len();

        let accepted = accept_entries(entries, place, evaluator);
        tracing::info!(
            activity = %place.activity_name,
            proposed,
            accepted = accepted.len(),
            "llm image search finished"
        );
        accepted
    }
}

fn build_prompt(place: &PlaceQuery) -> String {
    let mut prompt = format!(
        "Find 3-5 real photographs of the following travel destination.\n\
         Requirements:\n\
         1. Every image must clearly show this exact place.\n\
         2. Each URL must be a real, publicly reachable image URL starting with http:// or https://.\n\
         3. Prefer well-known sources such as Wikipedia/Wikimedia Commons, Unsplash, or Pexels.\n\
         4. Do not return placeholders, sample images, logos, icons, maps, or made-up URLs.\n\
         5. If you are not sure about any image, return an empty array [] instead of guessing.\n\
         \n\
         Place name: {}",
        place.activity_name
    );
    if let Some(locality) = place.locality_name.as_deref() {
        let _ = write!(prompt, "\nLocation: {locality}");
    }
    prompt.push_str(
        "\n\nRespond with a JSON array only, for example:\n\
         [\n  {\"url\": \"https://example.com/image1.jpg\", \"description\": \"image description\"}\n]",
    );
    prompt
}

/// Pull the image entries out of free text.
///
/// Accepts a bare JSON array or an object with an `images` array, with any
/// amount of surrounding prose.
fn extract_entries(content: &str) -> Option<Vec<Value>> {
    if let Some(entries) = slice_between(content, '[', ']')
        .and_then(|s| serde_json::from_str::<Vec<Value>>(s).ok())
    {
        return Some(entries);
    }

    let object: Value = slice_between(content, '{', '}')
        .and_then(|s| serde_json::from_str(s).ok())?;
    match object.get("images") {
        Some(Value::Array(entries)) => Some(entries.clone()),
        _ => None,
    }
}

fn slice_between(content: &str, open: char, close: char) -> Option<&str> {
    let start = content.find(open)?;
    let end = content.rfind(close)?;
    (end > start).then(|| &content[start..=end])
}

fn accept_entries(
    entries: Vec<Value>,
    place: &PlaceQuery,
    evaluator: &RelevanceEvaluator,
) -> Vec<AcceptedImage> {
    let mut seen: HashSet<String> = HashSet::new();
    entries
        .into_iter()
        .filter_map(|entry| {
            let url = entry.get("url")?.as_str()?;
            let description = entry
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default();
            ImageCandidate::new(url, "", description, ProviderTag::Llm)
        })
        .filter(|candidate| seen.insert(candidate.url.clone()))
        .filter(|candidate| {
            let verdict =
                evaluator.evaluate_with(CandidateText::from(candidate), place, KeywordMode::Strict);
            if let Some(reason) = &verdict.rejection {
                tracing::debug!(url = %candidate.url, reason = %reason, "llm proposal rejected");
            }
            verdict.accepted
        })
        .take(MAX_ACCEPTED_IMAGES)
        .map(|candidate| candidate.into_accepted(place))
        .collect()
}
