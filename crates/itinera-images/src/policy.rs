//! Tunable word lists for the relevance evaluator.
//!
//! The built-in default targets Chinese and English place names. A deployment
//! can replace any list with a YAML file; omitted keys keep their defaults.

use std::path::Path;

use itinera_core::ConfigError;
use serde::{Deserialize, Serialize};

/// One exclusion rule. Any rule matching the candidate's URL, title, or
/// description rejects the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExclusionRule {
    /// Plain case-insensitive substring (`placeholder`, `lorem`).
    Marker(String),
    /// Whole word or phrase for Latin text, substring for CJK text. Keeps
    /// `icon` from rejecting "iconic".
    Word(String),
    /// File extension of the URL path or of a file-name title (`svg`).
    Extension(String),
    /// Image host or any of its subdomains (`picsum.photos`).
    Host(String),
}

impl std::fmt::Display for ExclusionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExclusionRule::Marker(v) => write!(f, "marker:{v}"),
            ExclusionRule::Word(v) => write!(f, "word:{v}"),
            ExclusionRule::Extension(v) => write!(f, "extension:{v}"),
            ExclusionRule::Host(v) => write!(f, "host:{v}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevancePolicy {
    /// Generic category words stripped from a place name before keyword
    /// extraction ("park", "scenic area", 风景区).
    pub cleaning_tokens: Vec<String>,
    /// Extra food/retail category words stripped in strict mode only.
    pub strict_cleaning_tokens: Vec<String>,
    /// Terms marking a place as a restaurant or shop.
    pub shop_indicators: Vec<String>,
    /// Terms removed from a shop's name to isolate its proper name.
    pub shop_suffixes: Vec<String>,
    pub exclusions: Vec<ExclusionRule>,
    /// Keywords shorter than this many characters are discarded.
    pub min_keyword_chars: usize,
}

const CLEANING_TOKENS: &[&str] = &[
    "国家森林公园",
    "风景名胜区",
    "烈士陵园",
    "购物中心",
    "观景台",
    "纪念馆",
    "博物馆",
    "风景区",
    "旅游区",
    "地铁站",
    "火车站",
    "公园",
    "景区",
    "景点",
    "旅游",
    "观光",
    "总店",
    "分店",
    "national forest park",
    "national park",
    "scenic area",
    "scenic spot",
    "shopping center",
    "shopping centre",
    "shopping mall",
    "observation deck",
    "memorial hall",
    "metro station",
    "subway station",
    "train station",
    "main store",
    "branch store",
    "flagship store",
    "tourism",
    "sightseeing",
    "park",
    "mall",
    "museum",
    "station",
    "branch",
    "the",
    "of",
    "and",
];

const STRICT_CLEANING_TOKENS: &[&str] = &[
    "餐厅",
    "饭店",
    "饭",
    "菜",
    "面",
    "馆",
    "restaurant",
    "restaurants",
    "noodle",
    "noodles",
    "cafe",
    "café",
    "kitchen",
    "grill",
];

const SHOP_INDICATORS: &[&str] = &[
    "店",
    "餐厅",
    "饭",
    "restaurant",
    "noodle",
    "noodles",
    "cafe",
    "café",
    "bistro",
    "diner",
    "eatery",
    "bakery",
    "teahouse",
    "shop",
    "store",
];

const SHOP_SUFFIXES: &[&str] = &[
    "总店",
    "分店",
    "餐厅",
    "饭店",
    "店",
    "饭",
    "菜",
    "面",
    "馆",
    "restaurant",
    "noodle",
    "noodles",
    "cafe",
    "café",
    "bistro",
    "diner",
    "eatery",
    "bakery",
    "teahouse",
    "shop",
    "store",
    "house",
    "kitchen",
    "grill",
    "bar",
    "main",
    "branch",
    "the",
    "of",
    "and",
];

const MARKERS: &[&str] = &[
    "placeholder",
    "default",
    "sample",
    "random",
    "picsum",
    "lorem",
    "dummy",
];

const ICONOGRAPHY_WORDS: &[&str] = &[
    "logo", "logos", "icon", "icons", "symbol", "emblem", "flag", "flags", "标志", "图标", "徽章",
    "徽标", "旗帜", "会徽",
];

const EXTENSIONS: &[&str] = &["svg", "gif"];

const FILLER_HOSTS: &[&str] = &[
    "picsum.photos",
    "placehold.co",
    "placehold.it",
    "via.placeholder.com",
    "dummyimage.com",
    "loremflickr.com",
    "placekitten.com",
    "fakeimg.pl",
];

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

impl Default for RelevancePolicy {
    fn default() -> Self {
        let exclusions = MARKERS
            .iter()
            .map(|m| ExclusionRule::Marker((*m).to_string()))
            .chain(
                ICONOGRAPHY_WORDS
                    .iter()
                    .map(|w| ExclusionRule::Word((*w).to_string())),
            )
            .chain(
                EXTENSIONS
                    .iter()
                    .map(|e| ExclusionRule::Extension((*e).to_string())),
            )
            .chain(
                FILLER_HOSTS
                    .iter()
                    .map(|h| ExclusionRule::Host((*h).to_string())),
            )
            .collect();

        Self {
            cleaning_tokens: owned(CLEANING_TOKENS),
            strict_cleaning_tokens: owned(STRICT_CLEANING_TOKENS),
            shop_indicators: owned(SHOP_INDICATORS),
            shop_suffixes: owned(SHOP_SUFFIXES),
            exclusions,
            min_keyword_chars: 2,
        }
    }
}

/// Load a relevance policy from a YAML file.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_policy(path: &Path) -> Result<RelevancePolicy, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PolicyFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_policy(&content)
}

/// Parse a relevance policy from YAML text.
///
/// # Errors
///
/// Returns [`ConfigError`] if the YAML is malformed or fails validation.
pub fn parse_policy(yaml: &str) -> Result<RelevancePolicy, ConfigError> {
    let policy: RelevancePolicy = serde_yaml::from_str(yaml)?;
    validate_policy(&policy)?;
    Ok(policy)
}

/// Load the policy named by `path`, or the built-in default when `None`.
///
/// # Errors
///
/// See [`load_policy`].
pub fn load_policy_or_default(path: Option<&Path>) -> Result<RelevancePolicy, ConfigError> {
    match path {
        Some(p) => load_policy(p),
        None => Ok(RelevancePolicy::default()),
    }
}

fn validate_policy(policy: &RelevancePolicy) -> Result<(), ConfigError> {
    if policy.min_keyword_chars == 0 {
        return Err(ConfigError::Validation(
            "min_keyword_chars must be at least 1".to_string(),
        ));
    }

    let lists = [
        ("cleaning_tokens", &policy.cleaning_tokens),
        ("strict_cleaning_tokens", &policy.strict_cleaning_tokens),
        ("shop_indicators", &policy.shop_indicators),
        ("shop_suffixes", &policy.shop_suffixes),
    ];
    for (name, list) in lists {
        if list.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "{name} must not contain blank entries"
            )));
        }
    }

    for rule in &policy.exclusions {
        let value = match rule {
            ExclusionRule::Marker(v)
            | ExclusionRule::Word(v)
            | ExclusionRule::Extension(v)
            | ExclusionRule::Host(v) => v,
        };
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "exclusion rule '{rule}' has a blank value"
            )));
        }
    }

    Ok(())
}
