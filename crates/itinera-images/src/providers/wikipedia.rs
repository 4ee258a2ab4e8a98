//! Encyclopedia adapter backed by the `MediaWiki` action API.
//!
//! Two stages: a full-text page search (primary language edition, then the
//! secondary one if nothing relevant turns up), followed by a per-page image
//! fetch. A failure or timeout in one stage only empties that stage.

use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use futures::future::join_all;
use itinera_core::{ImageCandidate, PlaceQuery, ProviderTag, SearchConfig, SearchTimeouts};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use super::http::{fetch_json, normalize_base_url};
use super::{keep_relevant, ImageProvider, PER_PROVIDER_LIMIT};
use crate::error::ImageError;
use crate::relevance::{CandidateText, RelevanceEvaluator};

const SEARCH_LIMIT: &str = "3";
const EMBEDDED_LOOKUP_LIMIT: &str = "10";
const EMBEDDED_PER_PAGE: usize = 3;
const THUMB_WIDTH: &str = "800";
const SKIPPED_FILE_EXTENSIONS: &[&str] = &["svg", "ogg", "webm", "ogv", "pdf", "gif"];

static THUMB_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d+px-").expect("valid thumbnail size regex"));

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchHit {
    pageid: u64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct PagesResponse {
    query: Option<PagesQuery>,
}

#[derive(Debug, Deserialize)]
struct PagesQuery {
    #[serde(default)]
    pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    title: String,
    original: Option<ImageSource>,
    thumbnail: Option<ImageSource>,
    #[serde(default)]
    images: Vec<FileRef>,
    #[serde(default)]
    imageinfo: Vec<ImageInfo>,
}

#[derive(Debug, Deserialize)]
struct ImageSource {
    source: String,
}

#[derive(Debug, Deserialize)]
struct FileRef {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ImageInfo {
    url: Option<String>,
    thumburl: Option<String>,
}

pub struct WikipediaProvider {
    client: Client,
    /// `api.php` endpoints, primary language first.
    endpoints: Vec<String>,
    timeouts: SearchTimeouts,
}

impl WikipediaProvider {
    /// Provider for the configured primary and secondary language editions.
    /// Blank language codes are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidBaseUrl`] if a language code produces an
    /// invalid URL.
    pub fn new(client: Client, config: &SearchConfig) -> Result<Self, ImageError> {
        let endpoints: Vec<String> = configured_languages(config)
            .into_iter()
            .map(|lang| format!("https://{lang}.wikipedia.org/w/api.php"))
            .collect();
        Self::with_endpoints(client, &endpoints, config.timeouts)
    }

    /// Provider with explicit `api.php` URLs (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidBaseUrl`] if any endpoint is not a valid URL.
    pub fn with_endpoints(
        client: Client,
        endpoints: &[String],
        timeouts: SearchTimeouts,
    ) -> Result<Self, ImageError> {
        let mut normalized: Vec<String> = Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            let endpoint = normalize_base_url(endpoint)?;
            if !normalized.contains(&endpoint) {
                normalized.push(endpoint);
            }
        }
        Ok(Self {
            client,
            endpoints: normalized,
            timeouts,
        })
    }

    /// Search hits whose title contains a name keyword.
    async fn relevant_pages(
        &self,
        endpoint: &str,
        place: &PlaceQuery,
        keywords: &[String],
    ) -> Result<Vec<SearchHit>, ImageError> {
        let request = self
            .client
            .get(endpoint)
            .timeout(self.timeouts.search)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", place.activity_name.as_str()),
                ("srlimit", SEARCH_LIMIT),
                ("format", "json"),
                ("utf8", "1"),
            ]);
        let response: SearchResponse = fetch_json(request, "wikipedia list=search").await?;

        let hits = response.query.map(|q| q.search).unwrap_or_default();
        Ok(hits
            .into_iter()
            .filter(|hit| {
                let title = hit.title.to_lowercase();
                keywords.iter().any(|k| title.contains(k.as_str()))
            })
            .collect())
    }

    /// Principal image plus up to [`EMBEDDED_PER_PAGE`] embedded images of
    /// one page, each checked by the evaluator.
    async fn page_images(
        &self,
        endpoint: &str,
        hit: &SearchHit,
        place: &PlaceQuery,
        evaluator: &RelevanceEvaluator,
    ) -> Result<Vec<ImageCandidate>, ImageError> {
        let pageid = hit.pageid.to_string();
        let request = self
            .client
            .get(endpoint)
            .timeout(self.timeouts.page)
            .query(&[
                ("action", "query"),
                ("pageids", pageid.as_str()),
                ("prop", "pageimages|images"),
                ("piprop", "original|thumbnail"),
                ("pithumbsize", THUMB_WIDTH),
                ("imlimit", EMBEDDED_LOOKUP_LIMIT),
                ("format", "json"),
            ]);
        let response: PagesResponse = fetch_json(request, "wikipedia prop=pageimages").await?;

        let Some(page) = response
            .query
            .and_then(|q| q.pages.into_values().next())
        else {
            return Ok(Vec::new());
        };
        let page_title = if page.title.is_empty() {
            hit.title.clone()
        } else {
            page.title.clone()
        };

        let mut candidates = Vec::new();

        let principal = page
            .original
            .map(|o| o.source)
            .or_else(|| page.thumbnail.map(|t| resize_thumbnail(&t.source)));
        if let Some(url) = principal {
            candidates.extend(ImageCandidate::new(
                url,
                page_title.as_str(),
                "",
                ProviderTag::Wikipedia,
            ));
        }

        let files: Vec<String> = page
            .images
            .into_iter()
            .map(|f| f.title)
            .filter(|title| !has_skipped_extension(title))
            .filter(|title| {
                evaluator
                    .exclusion(CandidateText {
                        title,
                        ..CandidateText::default()
                    })
                    .is_none()
            })
            .take(EMBEDDED_PER_PAGE)
            .collect();

        let lookups = files.iter().map(|title| self.resolve_file(endpoint, title));
        for (title, result) in files.iter().zip(join_all(lookups).await) {
            match result {
                Ok(Some(url)) => {
                    candidates.extend(ImageCandidate::new(
                        url,
                        strip_namespace(title),
                        "",
                        ProviderTag::Wikipedia,
                    ));
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(file = %title, error = %e, "wikipedia imageinfo lookup failed");
                }
            }
        }

        Ok(keep_relevant(candidates, place, evaluator, usize::MAX))
    }

    /// Resolve a `File:` title to a (preferably 800px) URL.
    async fn resolve_file(&self, endpoint: &str, title: &str) -> Result<Option<String>, ImageError> {
        let request = self
            .client
            .get(endpoint)
            .timeout(self.timeouts.file)
            .query(&[
                ("action", "query"),
                ("titles", title),
                ("prop", "imageinfo"),
                ("iiprop", "url"),
                ("iiurlwidth", THUMB_WIDTH),
                ("format", "json"),
            ]);
        let response: PagesResponse = fetch_json(request, "wikipedia prop=imageinfo").await?;

        Ok(response
            .query
            .and_then(|q| q.pages.into_values().next())
            .and_then(|page| page.imageinfo.into_iter().next())
            .and_then(|info| info.thumburl.or(info.url)))
    }
}

#[async_trait]
impl ImageProvider for WikipediaProvider {
    fn tag(&self) -> ProviderTag {
        ProviderTag::Wikipedia
    }

    async fn search(
        &self,
        place: &PlaceQuery,
        evaluator: &RelevanceEvaluator,
    ) -> Result<Vec<ImageCandidate>, ImageError> {
        let keywords = evaluator.title_keywords(&place.activity_name);
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let mut pages: Vec<(&str, SearchHit)> = Vec::new();
        for endpoint in &self.endpoints {
            match self.relevant_pages(endpoint, place, &keywords).await {
                Ok(hits) if !hits.is_empty() => {
                    pages = hits.into_iter().map(|hit| (endpoint.as_str(), hit)).collect();
                    break;
                }
                Ok(_) => {
                    tracing::debug!(
                        endpoint = %endpoint,
                        activity = %place.activity_name,
                        "no relevant wikipedia pages"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        endpoint = %endpoint,
                        activity = %place.activity_name,
                        error = %e,
                        "wikipedia page search failed"
                    );
                }
            }
        }

        let mut images: Vec<ImageCandidate> = Vec::new();
        for (endpoint, hit) in &pages {
            match self.page_images(endpoint, hit, place, evaluator).await {
                Ok(found) => {
                    for candidate in found {
                        if !images.iter().any(|c| c.url == candidate.url) {
                            images.push(candidate);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        page = %hit.title,
                        activity = %place.activity_name,
                        error = %e,
                        "wikipedia page image fetch failed"
                    );
                }
            }
            if images.len() >= PER_PROVIDER_LIMIT {
                break;
            }
        }

        images.truncate(PER_PROVIDER_LIMIT);
        Ok(images)
    }
}

/// Non-blank language codes, primary first.
pub(crate) fn configured_languages(config: &SearchConfig) -> Vec<&str> {
    [
        config.wikipedia_primary_lang.as_str(),
        config.wikipedia_secondary_lang.as_str(),
    ]
    .into_iter()
    .map(str::trim)
    .filter(|lang| !lang.is_empty())
    .collect()
}

/// Rewrite a thumbnail URL's `/<n>px-` segment to the 800px rendition.
fn resize_thumbnail(url: &str) -> String {
    THUMB_SIZE_RE
        .replace(url, format!("/{THUMB_WIDTH}px-").as_str())
        .into_owned()
}

fn has_skipped_extension(title: &str) -> bool {
    title
        .rsplit_once('.')
        .is_some_and(|(_, ext)| SKIPPED_FILE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// `"File:West Lake.jpg"` becomes `"West Lake.jpg"`.
fn strip_namespace(title: &str) -> &str {
    title.split_once(':').map_or(title, |(_, rest)| rest)
}
