//! Decides whether a candidate image is actually about a place.
//!
//! Matching is purely textual: the place name is reduced to its proper-noun
//! core (generic words such as "park" or 风景区 removed), and at least one
//! remaining keyword must appear in the candidate's URL, title, or
//! description. Exclusion rules and the shop-name rule then tighten that
//! recall-first test. Nothing here performs I/O.

use std::sync::LazyLock;

use itinera_core::{ImageCandidate, PlaceQuery};
use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::policy::{ExclusionRule, RelevancePolicy};

static POSSESSIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'s\b").expect("valid possessive regex"));

/// How aggressively a place name is reduced before keyword extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeywordMode {
    /// Generic category words only. Used for provider results.
    #[default]
    Standard,
    /// Also strips food and retail category words, so an ungrounded
    /// suggestion cannot pass on "restaurant" or 面 alone.
    Strict,
}

/// Why a candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The place name has no usable keyword; nothing can match safely.
    NoKeywords,
    NoKeywordMatch,
    /// An exclusion rule matched; carries the rule's display form.
    Excluded(String),
    /// The place is a shop or restaurant and its proper name is absent.
    ShopNameMissing,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::NoKeywords => write!(f, "no keywords"),
            Rejection::NoKeywordMatch => write!(f, "no keyword match"),
            Rejection::Excluded(rule) => write!(f, "excluded by {rule}"),
            Rejection::ShopNameMissing => write!(f, "shop name missing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevanceVerdict {
    pub accepted: bool,
    /// First keyword found in the candidate text, reported even on rejection.
    pub matched_keyword: Option<String>,
    pub rejection: Option<Rejection>,
}

impl RelevanceVerdict {
    fn accept(matched_keyword: Option<String>) -> Self {
        Self {
            accepted: true,
            matched_keyword,
            rejection: None,
        }
    }

    fn reject(matched_keyword: Option<String>, rejection: Rejection) -> Self {
        Self {
            accepted: false,
            matched_keyword,
            rejection: Some(rejection),
        }
    }
}

/// The text fields of a candidate that take part in matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateText<'a> {
    pub url: &'a str,
    pub title: &'a str,
    pub description: &'a str,
}

impl<'a> From<&'a ImageCandidate> for CandidateText<'a> {
    fn from(candidate: &'a ImageCandidate) -> Self {
        Self {
            url: &candidate.url,
            title: &candidate.title,
            description: &candidate.description,
        }
    }
}

/// Lowercased candidate fields; the URL is percent-decoded so CJK keywords
/// match encyclopedia file URLs.
struct Haystack {
    fields: [String; 3],
    host: Option<String>,
}

impl Haystack {
    fn new(text: CandidateText<'_>) -> Self {
        let decoded_url = percent_decode_str(text.url).decode_utf8_lossy().to_lowercase();
        let host = reqwest::Url::parse(text.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase));
        Self {
            fields: [
                decoded_url,
                text.title.to_lowercase(),
                text.description.to_lowercase(),
            ],
            host,
        }
    }

    fn contains(&self, needle: &str) -> bool {
        self.fields.iter().any(|f| f.contains(needle))
    }

    fn matches(&self, rule: &ExclusionRule) -> bool {
        match rule {
            ExclusionRule::Marker(marker) => self.contains(marker),
            ExclusionRule::Word(word) => self.fields.iter().any(|f| contains_term(f, word)),
            ExclusionRule::Extension(ext) => self.fields.iter().any(|f| has_extension(f, ext)),
            ExclusionRule::Host(domain) => self.host.as_deref().is_some_and(|host| {
                host == domain
                    || host
                        .strip_suffix(domain.as_str())
                        .is_some_and(|rest| rest.ends_with('.'))
            }),
        }
    }
}

/// Relevance evaluator built from a [`RelevancePolicy`].
///
/// Token lists are normalized once at construction and ordered longest
/// first, so "national park" is stripped before "park".
#[derive(Debug, Clone)]
pub struct RelevanceEvaluator {
    cleaning: Vec<String>,
    strict_cleaning: Vec<String>,
    shop_indicators: Vec<String>,
    shop_suffixes: Vec<String>,
    exclusions: Vec<ExclusionRule>,
    min_keyword_chars: usize,
}

impl Default for RelevanceEvaluator {
    fn default() -> Self {
        Self::new(&RelevancePolicy::default())
    }
}

impl RelevanceEvaluator {
    #[must_use]
    pub fn new(policy: &RelevancePolicy) -> Self {
        let cleaning = prepare_terms(policy.cleaning_tokens.iter());
        let strict_cleaning = prepare_terms(
            policy
                .cleaning_tokens
                .iter()
                .chain(policy.strict_cleaning_tokens.iter()),
        );
        let exclusions = policy
            .exclusions
            .iter()
            .map(|rule| match rule {
                ExclusionRule::Marker(v) => ExclusionRule::Marker(v.trim().to_lowercase()),
                ExclusionRule::Word(v) => ExclusionRule::Word(normalize_name(v)),
                ExclusionRule::Extension(v) => {
                    ExclusionRule::Extension(v.trim().trim_start_matches('.').to_lowercase())
                }
                ExclusionRule::Host(v) => ExclusionRule::Host(v.trim().to_lowercase()),
            })
            .collect();

        Self {
            cleaning,
            strict_cleaning,
            shop_indicators: prepare_terms(policy.shop_indicators.iter()),
            shop_suffixes: prepare_terms(policy.shop_suffixes.iter()),
            exclusions,
            min_keyword_chars: policy.min_keyword_chars.max(1),
        }
    }

    /// Evaluate a candidate with [`KeywordMode::Standard`].
    #[must_use]
    pub fn evaluate(&self, candidate: CandidateText<'_>, place: &PlaceQuery) -> RelevanceVerdict {
        self.evaluate_with(candidate, place, KeywordMode::Standard)
    }

    #[must_use]
    pub fn evaluate_with(
        &self,
        candidate: CandidateText<'_>,
        place: &PlaceQuery,
        mode: KeywordMode,
    ) -> RelevanceVerdict {
        let normalized = normalize_name(&place.activity_name);
        let keywords = self.keywords_from_normalized(&normalized, mode);
        if keywords.is_empty() {
            return RelevanceVerdict::reject(None, Rejection::NoKeywords);
        }

        let haystack = Haystack::new(candidate);
        let matched = keywords.into_iter().find(|k| haystack.contains(k));

        if let Some(rule) = self.exclusions.iter().find(|rule| haystack.matches(rule)) {
            return RelevanceVerdict::reject(matched, Rejection::Excluded(rule.to_string()));
        }

        if matched.is_none() {
            return RelevanceVerdict::reject(None, Rejection::NoKeywordMatch);
        }

        let shop_keywords = self.shop_keywords(&normalized);
        if !shop_keywords.is_empty() && !shop_keywords.iter().any(|k| haystack.contains(k)) {
            return RelevanceVerdict::reject(matched, Rejection::ShopNameMissing);
        }

        RelevanceVerdict::accept(matched)
    }

    /// Keywords extracted from a place name.
    ///
    /// Falls back to the whole punctuation-stripped name when cleaning
    /// removes everything; an empty result means the name cannot anchor a
    /// match.
    #[must_use]
    pub fn keywords(&self, activity_name: &str, mode: KeywordMode) -> Vec<String> {
        self.keywords_from_normalized(&normalize_name(activity_name), mode)
    }

    /// Keywords for checking encyclopedia page titles: the standard keywords
    /// plus the uncleaned name words, so a page titled with the full name
    /// still counts.
    #[must_use]
    pub fn title_keywords(&self, activity_name: &str) -> Vec<String> {
        let normalized = normalize_name(activity_name);
        let mut keywords = self.keywords_from_normalized(&normalized, KeywordMode::Standard);
        for word in normalized.split_whitespace() {
            if word.chars().count() >= self.min_keyword_chars && !keywords.iter().any(|k| k == word)
            {
                keywords.push(word.to_string());
            }
        }
        keywords
    }

    /// The first exclusion rule the candidate text trips, if any.
    #[must_use]
    pub fn exclusion(&self, candidate: CandidateText<'_>) -> Option<&ExclusionRule> {
        let haystack = Haystack::new(candidate);
        self.exclusions.iter().find(|rule| haystack.matches(rule))
    }

    /// Shop-name keywords when the place is a shop or restaurant, else empty.
    fn shop_keywords(&self, normalized: &str) -> Vec<String> {
        if !self
            .shop_indicators
            .iter()
            .any(|indicator| contains_term(normalized, indicator))
        {
            return Vec::new();
        }
        let core = strip_terms(normalized, &self.shop_suffixes);
        self.usable_tokens(core.split_whitespace())
    }

    fn keywords_from_normalized(&self, normalized: &str, mode: KeywordMode) -> Vec<String> {
        let terms = match mode {
            KeywordMode::Standard => &self.cleaning,
            KeywordMode::Strict => &self.strict_cleaning,
        };
        let core = strip_terms(normalized, terms);
        if core.is_empty() {
            return self.usable_tokens(std::iter::once(normalized).filter(|n| !n.is_empty()));
        }
        self.usable_tokens(core.split_whitespace())
    }

    fn usable_tokens<'a>(&self, tokens: impl Iterator<Item = &'a str>) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for token in tokens {
            if token.chars().count() >= self.min_keyword_chars && !out.iter().any(|t| t == token) {
                out.push(token.to_string());
            }
        }
        out
    }
}

/// Lowercase, drop possessives and apostrophes, and turn every other
/// non-alphanumeric character (brackets included) into a single space.
pub(crate) fn normalize_name(name: &str) -> String {
    let lower = name.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'");
    let without_possessive = POSSESSIVE_RE.replace_all(&lower, "");
    let spaced: String = without_possessive
        .chars()
        .filter(|c| *c != '\'')
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    collapse_whitespace(&spaced)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn prepare_terms<'a>(terms: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut prepared: Vec<String> = Vec::new();
    for term in terms {
        let normalized = normalize_name(term);
        if !normalized.is_empty() && !prepared.contains(&normalized) {
            prepared.push(normalized);
        }
    }
    prepared.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    prepared
}

fn is_cjk(c: char) -> bool {
    matches!(
        c,
        '\u{3040}'..='\u{30ff}'
            | '\u{3400}'..='\u{4dbf}'
            | '\u{4e00}'..='\u{9fff}'
            | '\u{f900}'..='\u{faff}'
            | '\u{ac00}'..='\u{d7af}'
    )
}

fn has_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}

/// CJK terms match as substrings; Latin terms only at word boundaries.
fn contains_term(haystack: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    if has_cjk(term) {
        return haystack.contains(term);
    }
    haystack.match_indices(term).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + term.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Remove every occurrence of `terms` from normalized text.
fn strip_terms(text: &str, terms: &[String]) -> String {
    let mut out = format!(" {text} ");
    for term in terms {
        if has_cjk(term) {
            out = out.replace(term.as_str(), " ");
        } else {
            let needle = format!(" {term} ");
            while out.contains(&needle) {
                out = out.replace(&needle, " ");
            }
        }
    }
    collapse_whitespace(&out)
}

fn has_extension(text: &str, ext: &str) -> bool {
    let end = text.find(['?', '#']).unwrap_or(text.len());
    text[..end]
        .trim_end()
        .strip_suffix(ext)
        .is_some_and(|rest| rest.len() > 1 && rest.ends_with('.'))
}

#[cfg(test)]
#[path = "relevance_test.rs"]
mod tests;
