use serde::{Deserialize, Serialize};

/// One itinerary stop to find photographs for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceQuery {
    /// Display name of the stop, possibly carrying generic suffixes
    /// ("park", "branch store", 博物馆).
    pub activity_name: String,
    /// Surrounding city or region. Only used to enrich descriptions and
    /// prompts, never required for a relevance match.
    pub locality_name: Option<String>,
}

impl PlaceQuery {
    #[must_use]
    pub fn new(activity_name: impl Into<String>) -> Self {
        Self {
            activity_name: activity_name.into(),
            locality_name: None,
        }
    }

    #[must_use]
    pub fn with_locality(mut self, locality_name: impl Into<String>) -> Self {
        let locality = locality_name.into();
        self.locality_name = if locality.trim().is_empty() {
            None
        } else {
            Some(locality)
        };
        self
    }

    /// `"<name> (<locality>)"`, or just the name when no locality is known.
    #[must_use]
    pub fn display_label(&self) -> String {
        match self.locality_name.as_deref() {
            Some(locality) => format!("{} ({locality})", self.activity_name),
            None => self.activity_name.clone(),
        }
    }
}

/// Which external source produced an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderTag {
    Wikipedia,
    Unsplash,
    Pexels,
    GoogleSearch,
    BingSearch,
    Llm,
}

impl ProviderTag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderTag::Wikipedia => "wikipedia",
            ProviderTag::Unsplash => "unsplash",
            ProviderTag::Pexels => "pexels",
            ProviderTag::GoogleSearch => "google_search",
            ProviderTag::BingSearch => "bing_search",
            ProviderTag::Llm => "llm",
        }
    }

    /// Human-facing provider name used in fallback descriptions.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            ProviderTag::Wikipedia => "Wikipedia",
            ProviderTag::Unsplash => "Unsplash",
            ProviderTag::Pexels => "Pexels",
            ProviderTag::GoogleSearch => "Google",
            ProviderTag::BingSearch => "Bing",
            ProviderTag::Llm => "AI search",
        }
    }
}

impl std::fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unverified image returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    /// Absolute `http(s)` URL.
    pub url: String,
    /// Provider-side title (page title, file name, alt text). May be empty.
    pub title: String,
    /// Provider-side caption. May be empty.
    pub description: String,
    pub source: ProviderTag,
}

impl ImageCandidate {
    /// Returns `None` unless `url` is an absolute `http` or `https` URL.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        source: ProviderTag,
    ) -> Option<Self> {
        let url = url.into().trim().to_string();
        if !is_http_url(&url) {
            return None;
        }
        Some(Self {
            url,
            title: title.into(),
            description: description.into(),
            source,
        })
    }

    /// Converts a candidate that passed relevance filtering.
    ///
    /// Providers leave `description` empty when they have no caption; the
    /// accepted image then gets `"<name> (<locality>) - Wikipedia"` for
    /// encyclopedia images and `"<name> - <Provider>"` for everything else,
    /// so the synthesized text never takes part in relevance matching.
    #[must_use]
    pub fn into_accepted(self, place: &PlaceQuery) -> AcceptedImage {
        let description = if self.description.trim().is_empty() {
            let label = match self.source {
                ProviderTag::Wikipedia => place.display_label(),
                _ => place.activity_name.clone(),
            };
            format!("{label} - {}", self.source.display_name())
        } else {
            self.description
        };
        AcceptedImage {
            url: self.url,
            description,
            source: self.source,
        }
    }
}

/// A candidate that passed relevance filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedImage {
    pub url: String,
    pub description: String,
    pub source: ProviderTag,
}

fn is_http_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"));
    rest.is_some_and(|r| !r.is_empty() && !r.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_requires_absolute_http_url() {
        assert!(ImageCandidate::new("https://x.org/a.jpg", "", "", ProviderTag::Pexels).is_some());
        assert!(ImageCandidate::new("HTTP://x.org/a.jpg", "", "", ProviderTag::Pexels).is_some());
        assert!(ImageCandidate::new("//x.org/a.jpg", "", "", ProviderTag::Pexels).is_none());
        assert!(ImageCandidate::new("/a.jpg", "", "", ProviderTag::Pexels).is_none());
        assert!(ImageCandidate::new("ftp://x.org/a.jpg", "", "", ProviderTag::Pexels).is_none());
        assert!(ImageCandidate::new("https://", "", "", ProviderTag::Pexels).is_none());
    }

    #[test]
    fn blank_locality_is_dropped() {
        let place = PlaceQuery::new("West Lake").with_locality("  ");
        assert!(place.locality_name.is_none());
        assert_eq!(place.display_label(), "West Lake");
    }

    #[test]
    fn display_label_includes_locality() {
        let place = PlaceQuery::new("West Lake").with_locality("Hangzhou");
        assert_eq!(place.display_label(), "West Lake (Hangzhou)");
    }

    #[test]
    fn accepted_image_keeps_provider_caption() {
        let place = PlaceQuery::new("West Lake");
        let accepted = ImageCandidate::new(
            "https://x.org/west-lake.jpg",
            "",
            "West Lake at sunrise",
            ProviderTag::Unsplash,
        )
        .unwrap()
        .into_accepted(&place);
        assert_eq!(accepted.description, "West Lake at sunrise");
    }

    #[test]
    fn accepted_image_synthesizes_missing_caption() {
        let place = PlaceQuery::new("West Lake").with_locality("Hangzhou");
        let accepted =
            ImageCandidate::new("https://x.org/west-lake.jpg", "West Lake", "", ProviderTag::Wikipedia)
                .unwrap()
                .into_accepted(&place);
        assert_eq!(accepted.description, "West Lake (Hangzhou) - Wikipedia");
        assert_eq!(accepted.source, ProviderTag::Wikipedia);
    }

    #[test]
    fn stock_caption_fallback_omits_locality() {
        let place = PlaceQuery::new("West Lake").with_locality("Hangzhou");
        let accepted =
            ImageCandidate::new("https://x.org/west-lake.jpg", "", " ", ProviderTag::Pexels)
                .unwrap()
                .into_accepted(&place);
        assert_eq!(accepted.description, "West Lake - Pexels");
    }

    #[test]
    fn provider_tag_serializes_snake_case() {
        let json = serde_json::to_string(&ProviderTag::GoogleSearch).unwrap();
        assert_eq!(json, "\"google_search\"");
    }
}
