//! Face location port.

use async_trait::async_trait;
use image::DynamicImage;

use crate::domain::DetectedFace;

/// Port for locating faces in a full image.
#[async_trait]
pub trait FaceLocator: Send + Sync {
    /// Locates faces in `image`.
    ///
    /// Returns an empty vector when the image contains no faces; "no faces"
    /// is never an error.
    ///
    /// # Errors
    ///
    /// Returns an error only for genuine model or I/O failure.
    async fn locate(&self, image: &DynamicImage) -> anyhow::Result<Vec<DetectedFace>>;
}
