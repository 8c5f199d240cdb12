//! Gender classification port.

use async_trait::async_trait;
use image::DynamicImage;

use crate::domain::GenderEstimate;

/// Port for estimating the apparent gender of one cropped face.
///
/// Single-face contract: the pipeline fans calls out across detected faces
/// and overwrites `face_id` on the returned estimate with the located face's
/// handle, so implementations may leave it zero.
#[async_trait]
pub trait GenderClassifier: Send + Sync {
    /// Classifies one padded face crop.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails for this crop.
    async fn classify(&self, face_crop: &DynamicImage) -> anyhow::Result<GenderEstimate>;
}
