//! Batch image search for a whole itinerary.

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use futures::FutureExt;
use itinera_core::PlaceQuery;
use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::ImageError;
use crate::pipeline::ImagePipeline;
use crate::store::ImageStore;

/// Counts from one batch run. `processed` counts distinct activities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ItinerarySummary {
    pub processed: usize,
    /// Already had saved images; providers were not queried.
    pub skipped: usize,
    pub saved: usize,
    /// Searched, but nothing trustworthy was found.
    pub empty: usize,
    pub failed: usize,
}

enum ActivityOutcome {
    Skipped,
    Saved(usize),
    Empty,
}

impl ImagePipeline {
    /// Search and save images for every activity of a plan.
    ///
    /// Activities run with bounded concurrency. Duplicate names are handled
    /// once. An activity that already has saved images is skipped, so a
    /// repeated run does not query providers again. A failing activity is
    /// logged and counted; it never stops the others.
    pub async fn process_itinerary(
        &self,
        store: &dyn ImageStore,
        plan_id: Uuid,
        activities: &[PlaceQuery],
    ) -> ItinerarySummary {
        let mut seen: HashSet<&str> = HashSet::new();
        let unique: Vec<PlaceQuery> = activities
            .iter()
            .filter(|place| !place.activity_name.trim().is_empty())
            .filter(|place| seen.insert(place.activity_name.as_str()))
            .cloned()
            .collect();

        tracing::info!(
            plan_id = %plan_id,
            activities = unique.len(),
            max_concurrent = self.max_concurrent_activities,
            "processing itinerary images"
        );

        // Boxed so the batch future stays Send under tokio::spawn.
        let results: Vec<(PlaceQuery, Result<ActivityOutcome, String>)> = stream::iter(unique)
            .map(|place| {
                async move {
                    let outcome = AssertUnwindSafe(self.process_activity(store, plan_id, &place))
                        .catch_unwind()
                        .await
                        .map_err(|_| "activity processing panicked".to_string())
                        .and_then(|r| r.map_err(|e| e.to_string()));
                    (place, outcome)
                }
                .boxed()
            })
            .buffer_unordered(self.max_concurrent_activities.max(1))
            .collect()
            .await;

        let mut summary = ItinerarySummary {
            processed: results.len(),
            ..ItinerarySummary::default()
        };
        for (place, outcome) in results {
            match outcome {
                Ok(ActivityOutcome::Skipped) => summary.skipped += 1,
                Ok(ActivityOutcome::Saved(count)) => {
                    tracing::debug!(
                        plan_id = %plan_id,
                        activity = %place.activity_name,
                        count,
                        "saved activity images"
                    );
                    summary.saved += 1;
                }
                Ok(ActivityOutcome::Empty) => summary.empty += 1,
                Err(error) => {
                    tracing::error!(
                        plan_id = %plan_id,
                        activity = %place.activity_name,
                        error = %error,
                        "activity image processing failed"
                    );
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            plan_id = %plan_id,
            processed = summary.processed,
            skipped = summary.skipped,
            saved = summary.saved,
            empty = summary.empty,
            failed = summary.failed,
            "itinerary images done"
        );
        summary
    }

    async fn process_activity(
        &self,
        store: &dyn ImageStore,
        plan_id: Uuid,
        place: &PlaceQuery,
    ) -> Result<ActivityOutcome, ImageError> {
        if store.has_images(plan_id, &place.activity_name).await? {
            return Ok(ActivityOutcome::Skipped);
        }

        let images = self.search(place).await;
        if images.is_empty() {
            return Ok(ActivityOutcome::Empty);
        }

        store
            .replace_images(plan_id, &place.activity_name, &images)
            .await?;
        Ok(ActivityOutcome::Saved(images.len()))
    }
}

/// Run [`ImagePipeline::process_itinerary`] on a detached task.
///
/// Callers that do not care about the outcome can drop the handle; the run
/// logs its own results.
pub fn spawn_itinerary(
    pipeline: Arc<ImagePipeline>,
    store: Arc<dyn ImageStore>,
    plan_id: Uuid,
    activities: Vec<PlaceQuery>,
) -> JoinHandle<ItinerarySummary> {
    tokio::spawn(async move {
        pipeline
            .process_itinerary(store.as_ref(), plan_id, &activities)
            .await
    })
}
