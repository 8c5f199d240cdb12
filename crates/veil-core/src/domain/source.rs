//! Caller-supplied image input.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use image::DynamicImage;

/// A decoded image handed to the moderation pipeline.
///
/// Pixel data sits behind an `Arc` so an evaluation run can hold on to the
/// buffer without copying it.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Display identifier (source URL, path, or synthetic name).
    pub uri: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    image: Arc<DynamicImage>,
}

impl SourceImage {
    /// Wraps a decoded image with its display identifier.
    #[must_use]
    pub fn new(uri: impl Into<String>, image: DynamicImage) -> Self {
        let width = image.width();
        let height = image.height();
        Self {
            uri: uri.into(),
            width,
            height,
            image: Arc::new(image),
        }
    }

    /// The decoded pixel buffer.
    #[must_use]
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Stable in-process identity of the pixel content.
    ///
    /// Hashes the raw pixel bytes and dimensions, so two images with
    /// identical content share a fingerprint regardless of where they were
    /// fetched from. Not stable across processes; cache keys only.
    #[must_use]
    pub fn content_fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.width.hash(&mut hasher);
        self.height.hash(&mut hasher);
        self.image.as_bytes().hash(&mut hasher);
        hasher.finish()
    }
}
