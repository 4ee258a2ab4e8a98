use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::error::ImageError;

/// Shared HTTP client for all providers. Request timeouts are set per call.
///
/// # Errors
///
/// Returns [`ImageError::Http`] if the client cannot be constructed.
pub fn build_http_client(user_agent: &str) -> Result<Client, ImageError> {
    Ok(Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?)
}

/// Validate a base URL and strip any trailing slash.
pub(crate) fn normalize_base_url(base_url: &str) -> Result<String, ImageError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    Url::parse(trimmed).map_err(|e| ImageError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(trimmed.to_string())
}

/// Send a request, require a 2xx status, and decode the JSON body.
///
/// Query strings are dropped from status error URLs and transport errors
/// carry no URL at all, since some providers put credentials there.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    context: &str,
) -> Result<T, ImageError> {
    let response = request
        .send()
        .await
        .map_err(|e| ImageError::Http(e.without_url()))?;
    let status = response.status();
    if !status.is_success() {
        let mut url = response.url().clone();
        url.set_query(None);
        return Err(ImageError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let body = response
        .text()
        .await
        .map_err(|e| ImageError::Http(e.without_url()))?;
    serde_json::from_str(&body).map_err(|e| ImageError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_removed() {
        assert_eq!(
            normalize_base_url("https://api.unsplash.com/").unwrap(),
            "https://api.unsplash.com"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = normalize_base_url("not a url").unwrap_err();
        assert!(matches!(err, ImageError::InvalidBaseUrl { .. }));
    }
}
