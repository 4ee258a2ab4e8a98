//! Storage seam for accepted images.
//!
//! The pipeline only needs three operations per `(plan_id, activity_name)`:
//! an existence check, a full replace, and a list. [`PgImageStore`] backs them
//! with the `activity_images` table.

use async_trait::async_trait;
use itinera_core::AcceptedImage;
use itinera_db::{ActivityImageRow, NewActivityImage};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ImageError;

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Whether any image is saved for the activity.
    async fn has_images(&self, plan_id: Uuid, activity_name: &str) -> Result<bool, ImageError>;

    /// Replace every saved image for the activity with `images`.
    async fn replace_images(
        &self,
        plan_id: Uuid,
        activity_name: &str,
        images: &[AcceptedImage],
    ) -> Result<(), ImageError>;

    /// Saved images for the activity, oldest first.
    async fn list_images(
        &self,
        plan_id: Uuid,
        activity_name: &str,
    ) -> Result<Vec<ActivityImageRow>, ImageError>;
}

#[derive(Debug, Clone)]
pub struct PgImageStore {
    pool: PgPool,
}

impl PgImageStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImageStore for PgImageStore {
    async fn has_images(&self, plan_id: Uuid, activity_name: &str) -> Result<bool, ImageError> {
        Ok(itinera_db::activity_images_exist(&self.pool, plan_id, activity_name).await?)
    }

    async fn replace_images(
        &self,
        plan_id: Uuid,
        activity_name: &str,
        images: &[AcceptedImage],
    ) -> Result<(), ImageError> {
        let rows: Vec<NewActivityImage<'_>> = images
            .iter()
            .map(|image| NewActivityImage {
                image_url: &image.url,
                image_description: &image.description,
                source: Some(image.source.as_str()),
            })
            .collect();
        itinera_db::replace_activity_images(&self.pool, plan_id, activity_name, &rows).await?;
        Ok(())
    }

    async fn list_images(
        &self,
        plan_id: Uuid,
        activity_name: &str,
    ) -> Result<Vec<ActivityImageRow>, ImageError> {
        Ok(itinera_db::list_activity_images(&self.pool, plan_id, activity_name).await?)
    }
}
