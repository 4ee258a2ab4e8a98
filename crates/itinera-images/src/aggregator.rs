//! Concurrent fan-out over every enabled provider.

use std::collections::HashSet;

use futures::future::join_all;
use itinera_core::{AcceptedImage, ImageCandidate, PlaceQuery};

use crate::providers::{search_isolated, ImageProvider};
use crate::relevance::{CandidateText, RelevanceEvaluator};

/// Most images returned for one place.
pub const MAX_ACCEPTED_IMAGES: usize = 5;

/// Query every provider at once and merge what comes back.
///
/// Waits for all providers; a failed provider contributes nothing. Results are
/// merged in provider order, deduplicated by exact URL (first wins),
/// re-checked by the evaluator, and capped at [`MAX_ACCEPTED_IMAGES`]. An
/// empty result is returned as is, never padded with filler.
pub async fn aggregate(
    place: &PlaceQuery,
    providers: &[Box<dyn ImageProvider>],
    evaluator: &RelevanceEvaluator,
) -> Vec<AcceptedImage> {
    let searches = providers
        .iter()
        .map(|provider| search_isolated(provider.as_ref(), place, evaluator));
    let results = join_all(searches).await;

    let merged = merge_candidates(results.into_iter().flatten(), place, evaluator);
    tracing::debug!(
        activity = %place.activity_name,
        providers = providers.len(),
        accepted = merged.len(),
        "aggregated provider results"
    );
    merged
}

pub(crate) fn merge_candidates(
    candidates: impl IntoIterator<Item = ImageCandidate>,
    place: &PlaceQuery,
    evaluator: &RelevanceEvaluator,
) -> Vec<AcceptedImage> {
    let mut seen: HashSet<String> = HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.url.clone()))
        .filter(|candidate| {
            evaluator
                .evaluate(CandidateText::from(candidate), place)
                .accepted
        })
        .take(MAX_ACCEPTED_IMAGES)
        .map(|candidate| candidate.into_accepted(place))
        .collect()
}

#[cfg(test)]
mod tests {
    use itinera_core::ProviderTag;

    use super::*;

    fn candidate(url: &str, description: &str, source: ProviderTag) -> ImageCandidate {
        ImageCandidate::new(url, "", description, source).unwrap()
    }

    #[test]
    fn first_occurrence_of_a_url_wins() {
        let place = PlaceQuery::new("Eiffel Tower");
        let merged = merge_candidates(
            vec![
                candidate("https://x.org/eiffel.jpg", "from wikipedia", ProviderTag::Wikipedia),
                candidate("https://x.org/eiffel.jpg", "from unsplash", ProviderTag::Unsplash),
            ],
            &place,
            &RelevanceEvaluator::default(),
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].description, "from wikipedia");
        assert_eq!(merged[0].source, ProviderTag::Wikipedia);
    }

    #[test]
    fn final_gate_drops_irrelevant_candidates() {
        let place = PlaceQuery::new("Eiffel Tower");
        let merged = merge_candidates(
            vec![
                candidate("https://x.org/louvre.jpg", "", ProviderTag::Pexels),
                candidate("https://x.org/eiffel-logo.png", "", ProviderTag::Pexels),
                candidate("https://x.org/eiffel-tower.jpg", "", ProviderTag::Pexels),
            ],
            &place,
            &RelevanceEvaluator::default(),
        );
        let urls: Vec<&str> = merged.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, ["https://x.org/eiffel-tower.jpg"]);
    }

    #[test]
    fn result_is_capped() {
        let place = PlaceQuery::new("Eiffel Tower");
        let candidates = (0..8).map(|i| {
            candidate(
                &format!("https://x.org/eiffel-{i}.jpg"),
                "",
                ProviderTag::Unsplash,
            )
        });
        let merged = merge_candidates(candidates, &place, &RelevanceEvaluator::default());
        assert_eq!(merged.len(), MAX_ACCEPTED_IMAGES);
        assert_eq!(merged[0].url, "https://x.org/eiffel-0.jpg");
    }
}
