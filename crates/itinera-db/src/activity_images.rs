//! Database operations for the `activity_images` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `activity_images` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityImageRow {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub activity_name: String,
    pub image_url: String,
    pub image_description: String,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewActivityImage<'a> {
    pub image_url: &'a str,
    pub image_description: &'a str,
    pub source: Option<&'a str>,
}

/// Returns `true` when at least one image is stored for the activity.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn activity_images_exist(
    pool: &PgPool,
    plan_id: Uuid,
    activity_name: &str,
) -> Result<bool, DbError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (\
             SELECT 1 FROM activity_images \
             WHERE plan_id = $1 AND activity_name = $2\
         )",
    )
    .bind(plan_id)
    .bind(activity_name)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Replace every stored image for `(plan_id, activity_name)` with `images`.
///
/// Delete and insert run in one transaction, so readers see either the old
/// set or the new one. Concurrent replaces for the same activity resolve as
/// last-write-wins. Returns the number of rows inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails; the transaction is
/// rolled back and the previous set is left intact.
pub async fn replace_activity_images(
    pool: &PgPool,
    plan_id: Uuid,
    activity_name: &str,
    images: &[NewActivityImage<'_>],
) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM activity_images WHERE plan_id = $1 AND activity_name = $2")
        .bind(plan_id)
        .bind(activity_name)
        .execute(&mut *tx)
        .await?;

    let mut inserted = 0u64;
    if !images.is_empty() {
        let urls: Vec<String> = images.iter().map(|i| i.image_url.to_string()).collect();
        let descriptions: Vec<String> = images
            .iter()
            .map(|i| i.image_description.to_string())
            .collect();
        let sources: Vec<Option<String>> = images
            .iter()
            .map(|i| i.source.map(str::to_string))
            .collect();

        // clock_timestamp() advances per row, keeping insertion order for `list`.
        inserted = sqlx::query(
            "INSERT INTO activity_images \
                 (plan_id, activity_name, image_url, image_description, source, created_at) \
             SELECT $1, $2, u.image_url, u.image_description, u.source, clock_timestamp() \
             FROM UNNEST($3::text[], $4::text[], $5::text[]) \
                 WITH ORDINALITY AS u(image_url, image_description, source, ord) \
             ORDER BY u.ord",
        )
        .bind(plan_id)
        .bind(activity_name)
        .bind(&urls)
        .bind(&descriptions)
        .bind(&sources)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}

/// List stored images for an activity, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_activity_images(
    pool: &PgPool,
    plan_id: Uuid,
    activity_name: &str,
) -> Result<Vec<ActivityImageRow>, DbError> {
    let rows = sqlx::query_as::<_, ActivityImageRow>(
        "SELECT id, plan_id, activity_name, image_url, image_description, source, created_at \
         FROM activity_images \
         WHERE plan_id = $1 AND activity_name = $2 \
         ORDER BY created_at ASC, id ASC",
    )
    .bind(plan_id)
    .bind(activity_name)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
