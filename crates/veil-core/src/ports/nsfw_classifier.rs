//! NSFW classification port.

use async_trait::async_trait;
use image::DynamicImage;

use crate::domain::NsfwScores;

/// Port for scoring a full image against the fixed NSFW category taxonomy.
///
/// The category set is agreed upon at construction time; unscored categories
/// read as 0.0 downstream.
#[async_trait]
pub trait NsfwClassifier: Send + Sync {
    /// Scores the image per NSFW category.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    async fn classify(&self, image: &DynamicImage) -> anyhow::Result<NsfwScores>;
}
