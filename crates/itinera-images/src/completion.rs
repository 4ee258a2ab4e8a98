//! Client for an OpenAI-compatible chat-completion endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ImageError;
use crate::providers::http::fetch_json;

pub const DEFAULT_MODEL: &str = "qwen-plus";

const DASHSCOPE_COMPLETIONS_URL: &str =
    "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions";
const DASHSCOPE_INTL_COMPLETIONS_URL: &str =
    "https://dashscope-intl.aliyuncs.com/compatible-mode/v1/chat/completions";
const COMPLETIONS_PATH: &str = "/chat/completions";
const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Resolve the configured completion URL to a full `/chat/completions`
/// endpoint.
///
/// - unset or blank: the `DashScope` compatible-mode endpoint
/// - already contains `/chat/completions`: used as is
/// - a `DashScope` host: the matching international or mainland endpoint,
///   keeping an explicit `compatible-mode/v1` prefix
/// - anything else: `/chat/completions` is appended
#[must_use]
pub fn resolve_completion_url(configured: Option<&str>) -> String {
    let Some(url) = configured.map(str::trim).filter(|u| !u.is_empty()) else {
        return DASHSCOPE_COMPLETIONS_URL.to_string();
    };
    if url.contains(COMPLETIONS_PATH) {
        return url.to_string();
    }
    let base = url.trim_end_matches('/');
    if url.contains("dashscope") {
        if url.contains("dashscope-intl") {
            return DASHSCOPE_INTL_COMPLETIONS_URL.to_string();
        }
        if !url.contains("/compatible-mode/v1") {
            return DASHSCOPE_COMPLETIONS_URL.to_string();
        }
    }
    format!("{base}{COMPLETIONS_PATH}")
}

pub struct CompletionClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl CompletionClient {
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidBaseUrl`] if the resolved endpoint is not
    /// a valid URL.
    pub fn new(
        client: Client,
        api_key: &str,
        api_url: Option<&str>,
        model: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ImageError> {
        let endpoint = resolve_completion_url(api_url);
        reqwest::Url::parse(&endpoint).map_err(|e| ImageError::InvalidBaseUrl {
            url: endpoint.clone(),
            reason: e.to_string(),
        })?;
        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL);
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.to_string(),
            model: model.to_string(),
            timeout,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a single user prompt and return the first choice's content.
    ///
    /// # Errors
    ///
    /// - [`ImageError::Http`] on network failure or timeout.
    /// - [`ImageError::UnexpectedStatus`] on a non-2xx response.
    /// - [`ImageError::Deserialize`] if the body is not a chat response.
    /// - [`ImageError::Completion`] if the response has no content.
    pub async fn complete(&self, prompt: &str) -> Result<String, ImageError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage::user(prompt)],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let request = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .json(&body);

        let response: ChatResponse = fetch_json(request, "chat completion").await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ImageError::Completion("response has no choices".to_string()))?;

        if content.trim().is_empty() {
            return Err(ImageError::Completion("empty completion".to_string()));
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_url_defaults_to_dashscope() {
        assert_eq!(resolve_completion_url(None), DASHSCOPE_COMPLETIONS_URL);
        assert_eq!(resolve_completion_url(Some("  ")), DASHSCOPE_COMPLETIONS_URL);
    }

    #[test]
    fn full_completions_url_is_kept() {
        let url = "https://api.openai.com/v1/chat/completions";
        assert_eq!(resolve_completion_url(Some(url)), url);
    }

    #[test]
    fn dashscope_hosts_are_normalised() {
        assert_eq!(
            resolve_completion_url(Some("https://dashscope-intl.aliyuncs.com")),
            DASHSCOPE_INTL_COMPLETIONS_URL
        );
        assert_eq!(
            resolve_completion_url(Some("https://dashscope.aliyuncs.com/api/v1")),
            DASHSCOPE_COMPLETIONS_URL
        );
        assert_eq!(
            resolve_completion_url(Some("https://dashscope.aliyuncs.com/compatible-mode/v1/")),
            DASHSCOPE_COMPLETIONS_URL
        );
    }

    #[test]
    fn other_urls_get_path_appended() {
        assert_eq!(
            resolve_completion_url(Some("http://localhost:8000/v1/")),
            "http://localhost:8000/v1/chat/completions"
        );
    }

    #[test]
    fn blank_model_uses_default() {
        let client = CompletionClient::new(
            Client::new(),
            "sk-secret-123",
            None,
            Some(" "),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(client.model(), DEFAULT_MODEL);
        assert!(!format!("{client:?}").contains("sk-secret-123"));
    }
}
