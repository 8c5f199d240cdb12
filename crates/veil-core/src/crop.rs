//! Padded face-crop extraction.
//!
//! Crops are expanded beyond the detected box before gender classification;
//! the extra context measurably improves accuracy, so the expansion is part
//! of the pipeline contract rather than an implementation detail.

// Allow common image-geometry casts
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]

use image::{DynamicImage, GenericImageView};

use crate::domain::BoundingBox;
use crate::error::ModerationError;

/// Extracts the face region expanded by `padding_fraction` of the box width
/// in each direction, clamped to the image bounds.
///
/// # Errors
///
/// Returns [`ModerationError::InvalidInput`] if the clamped region has zero
/// area (degenerate box, or a box entirely outside the image).
pub fn face_crop(
    image: &DynamicImage,
    bbox: &BoundingBox,
    padding_fraction: f32,
) -> Result<DynamicImage, ModerationError> {
    let (img_width, img_height) = image.dimensions();
    let padding = (bbox.width() as f32 * padding_fraction) as u32;

    let left = bbox.left.saturating_sub(padding);
    let top = bbox.top.saturating_sub(padding);
    let right = bbox.right.saturating_add(padding).min(img_width);
    let bottom = bbox.bottom.saturating_add(padding).min(img_height);

    if right <= left || bottom <= top {
        return Err(ModerationError::InvalidInput(format!(
            "face region {bbox:?} has no area within a {img_width}x{img_height} image"
        )));
    }

    Ok(image.crop_imm(left, top, right - left, bottom - top))
}
