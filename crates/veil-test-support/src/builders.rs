//! Synthetic images and detection fixtures for testing.

use image::{DynamicImage, GrayImage, Luma, RgbImage};

use veil_core::domain::{BoundingBox, DetectedFace, SourceImage};

/// Builder for synthetic test images.
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    /// Creates a uniform gray image.
    #[must_use]
    pub fn uniform_gray(width: u32, height: u32, value: u8) -> SourceImage {
        let img = GrayImage::from_fn(width, height, |_, _| Luma([value]));
        SourceImage::new("synthetic://uniform_gray", DynamicImage::ImageLuma8(img))
    }

    /// Creates a high-contrast checkerboard pattern.
    #[must_use]
    pub fn checkerboard(width: u32, height: u32) -> SourceImage {
        let img = GrayImage::from_fn(width, height, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });
        SourceImage::new("synthetic://checkerboard", DynamicImage::ImageLuma8(img))
    }

    /// Creates a uniform RGB color image.
    #[must_use]
    pub fn rgb_uniform(width: u32, height: u32, r: u8, g: u8, b: u8) -> SourceImage {
        let img = RgbImage::from_fn(width, height, |_, _| image::Rgb([r, g, b]));
        SourceImage::new("synthetic://rgb_uniform", DynamicImage::ImageRgb8(img))
    }

    /// Creates a zero-area image (edge case input).
    #[must_use]
    pub fn zero_area() -> SourceImage {
        SourceImage::new("synthetic://zero_area", DynamicImage::new_rgb8(0, 0))
    }

    /// Returns a standard 256x256 portrait-sized test image.
    #[must_use]
    pub fn portrait() -> SourceImage {
        Self::uniform_gray(256, 256, 128)
    }
}

/// Creates a detected-face fixture with a confident locator score.
#[must_use]
pub fn face(id: u32, left: u32, top: u32, right: u32, bottom: u32) -> DetectedFace {
    DetectedFace {
        id,
        bounding_box: BoundingBox::new(left, top, right, bottom),
        locator_confidence: 0.9,
    }
}

/// Creates a centered face fixture sized for a 256x256 test image.
#[must_use]
pub fn centered_face(id: u32) -> DetectedFace {
    face(id, 96, 96, 160, 160)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_gray_dimensions() {
        let img = SyntheticImageBuilder::uniform_gray(64, 48, 100);
        assert_eq!(img.width, 64);
        assert_eq!(img.height, 48);
        assert_eq!(img.uri, "synthetic://uniform_gray");
    }

    #[test]
    fn test_checkerboard_pattern() {
        let img = SyntheticImageBuilder::checkerboard(32, 32);
        let luma = img.image().to_luma8();
        assert_eq!(luma.get_pixel(0, 0).0[0], 255);
        assert_eq!(luma.get_pixel(8, 0).0[0], 0);
    }

    #[test]
    fn test_zero_area_image() {
        let img = SyntheticImageBuilder::zero_area();
        assert_eq!(img.width, 0);
        assert_eq!(img.height, 0);
    }

    #[test]
    fn test_face_fixture_bounds() {
        let f = centered_face(3);
        assert_eq!(f.id, 3);
        assert_eq!(f.bounding_box.width(), 64);
        assert_eq!(f.bounding_box.height(), 64);
    }
}
