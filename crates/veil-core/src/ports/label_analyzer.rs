//! Generic label analysis port (optional signal).

use async_trait::async_trait;
use image::DynamicImage;

use crate::domain::LabelHit;

/// Port for generic semantic labeling of an image.
///
/// Optional collaborator: the pipeline functions with it entirely absent,
/// and only consults it when the primary signals allowed the image.
#[async_trait]
pub trait LabelAnalyzer: Send + Sync {
    /// Returns semantic labels with confidences for the image.
    ///
    /// # Errors
    ///
    /// Returns an error if analysis fails.
    async fn analyze(&self, image: &DynamicImage) -> anyhow::Result<Vec<LabelHit>>;
}
