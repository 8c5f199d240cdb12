//! The moderation verdict.

use serde::{Deserialize, Serialize};

use super::GenderEstimate;

/// Blur/no-blur verdict for one image, with its explanation and the signal
/// breakdown that produced it.
///
/// Produced exactly once per (image content, settings) pair and immutable
/// afterwards; concurrent callers for the same pair share one instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModerationDecision {
    /// Whether the image should be obscured.
    pub should_blur: bool,
    /// Human-readable justification, absent when the image is allowed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Number of faces the locator reported.
    pub faces_detected: usize,
    /// Faces tallied as female (includes uncertain faces in strict mode).
    pub females_detected: usize,
    /// Faces tallied as male.
    pub males_detected: usize,
    /// Faces whose gender estimate was below the confidence threshold or
    /// absent in strict mode.
    pub uncertain_faces: usize,
    /// Summed score of the configured NSFW categories, 0.0 when the
    /// classifier did not run.
    pub nsfw_score: f32,
    /// Whether the NSFW gate fired.
    pub is_nsfw: bool,
    /// Per-face gender estimates that were actually produced.
    pub per_face_gender: Vec<GenderEstimate>,
}
