//! Image command handlers for the CLI.
//!
//! `search` needs no database. `illustrate` and `images` connect to Postgres
//! using the configured `DATABASE_URL`; `illustrate` also applies pending
//! migrations first.

use std::path::Path;

use anyhow::Context;
use itinera_core::{AppConfig, Itinerary, PlaceQuery, SearchConfig};
use itinera_db::ActivityImageRow;
use itinera_images::{ImagePipeline, ImageStore, PgImageStore};
use uuid::Uuid;

/// Search one place and print the accepted images as pretty JSON.
///
/// # Errors
///
/// Returns an error if the pipeline cannot be built from configuration.
/// Provider failures are not errors; they produce an empty list.
pub(crate) async fn run_search(
    config: &AppConfig,
    name: &str,
    locality: Option<&str>,
) -> anyhow::Result<()> {
    let pipeline = ImagePipeline::from_config(&SearchConfig::from_app_config(config))
        .context("failed to build image pipeline")?;
    let place = place_query(name, locality);

    let images = pipeline.search(&place).await;
    if images.is_empty() {
        tracing::info!(activity = %place.activity_name, "no relevant images found");
    }
    println!("{}", serde_json::to_string_pretty(&images)?);
    Ok(())
}

/// Search and store images for every activity of the itinerary at `path`.
///
/// # Errors
///
/// Returns an error if the itinerary cannot be read or parsed, the database
/// is unreachable, migrations fail, or the pipeline cannot be built.
/// Per-activity failures are counted in the printed summary instead.
pub(crate) async fn run_illustrate(
    config: &AppConfig,
    plan_id: Uuid,
    path: &Path,
) -> anyhow::Result<()> {
    let activities = load_itinerary(path)?;
    if activities.is_empty() {
        println!("itinerary has no activities; nothing to do");
        return Ok(());
    }

    let pool = itinera_db::connect_pool_from_config(config).await?;
    itinera_db::run_migrations(&pool).await?;

    let pipeline = ImagePipeline::from_config(&SearchConfig::from_app_config(config))
        .context("failed to build image pipeline")?;
    tracing::info!(
        plan_id = %plan_id,
        providers = pipeline.provider_count(),
        fallback = pipeline.has_fallback(),
        "illustrating itinerary"
    );

    let store = PgImageStore::new(pool);
    let summary = pipeline
        .process_itinerary(&store, plan_id, &activities)
        .await;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Print the stored images for one activity.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the query fails.
pub(crate) async fn run_list_images(
    config: &AppConfig,
    plan_id: Uuid,
    activity: &str,
) -> anyhow::Result<()> {
    let pool = itinera_db::connect_pool_from_config(config).await?;
    let rows = PgImageStore::new(pool)
        .list_images(plan_id, activity)
        .await?;

    if rows.is_empty() {
        println!("no images stored for '{activity}' in plan {plan_id}");
        return Ok(());
    }
    for row in &rows {
        println!("{}", format_image_row(row));
    }
    Ok(())
}

pub(crate) fn place_query(name: &str, locality: Option<&str>) -> PlaceQuery {
    let query = PlaceQuery::new(name.trim());
    match locality {
        Some(locality) => query.with_locality(locality.trim()),
        None => query,
    }
}

/// Read a generated itinerary file and return one query per activity.
pub(crate) fn load_itinerary(path: &Path) -> anyhow::Result<Vec<PlaceQuery>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read itinerary {}", path.display()))?;
    let itinerary: Itinerary = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse itinerary {}", path.display()))?;
    Ok(itinerary.place_queries())
}

pub(crate) fn format_image_row(row: &ActivityImageRow) -> String {
    format!(
        "{}  [{}]  {}  {}",
        row.created_at.format("%Y-%m-%d %H:%M:%S"),
        row.source.as_deref().unwrap_or("-"),
        row.image_url,
        row.image_description
    )
}
