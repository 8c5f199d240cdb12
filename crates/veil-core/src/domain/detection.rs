//! Detection result types produced by the collaborator models.
//!
//! All values here are scoped to a single evaluation run; only
//! [`ModerationDecision`](super::ModerationDecision) escapes it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Axis-aligned box in source-image pixel coordinates.
///
/// `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge, inclusive.
    pub left: u32,
    /// Top edge, inclusive.
    pub top: u32,
    /// Right edge, exclusive.
    pub right: u32,
    /// Bottom edge, exclusive.
    pub bottom: u32,
}

impl BoundingBox {
    /// Creates a box from pixel edges.
    #[must_use]
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Box width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    /// Box height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }
}

/// A face located in the source image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    /// Opaque per-run handle assigned by the locator.
    pub id: u32,
    /// Face bounds in source-image pixel coordinates.
    pub bounding_box: BoundingBox,
    /// Locator confidence (0.0 to 1.0).
    pub locator_confidence: f32,
}

/// Gender estimate for one detected face.
///
/// `confidence` is the winning class's probability after normalization, so it
/// is at least 0.5 whenever an estimate exists at all. A classifier that
/// cannot produce an estimate yields no `GenderEstimate`, never a zero one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenderEstimate {
    /// Handle of the face this estimate belongs to.
    pub face_id: u32,
    /// Whether the winning class is female.
    pub is_female: bool,
    /// Winning-class probability (0.5 to 1.0).
    pub confidence: f32,
}

/// The fixed NSFW category taxonomy scored per image.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum NsfwCategory {
    /// Safe-for-work drawings.
    Drawing,
    /// Animated explicit content.
    Hentai,
    /// Neutral content.
    Neutral,
    /// Explicit photographic content.
    Porn,
    /// Suggestive photographic content.
    Sexy,
}

/// Per-category NSFW scores for one image.
///
/// Scores are independent per category and need not sum to 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NsfwScores {
    scores: BTreeMap<NsfwCategory, f32>,
}

impl NsfwScores {
    /// Creates an empty score vector (all categories read as 0.0).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a category score, returning `self` for chaining.
    #[must_use]
    pub fn with_score(mut self, category: NsfwCategory, score: f32) -> Self {
        self.scores.insert(category, score);
        self
    }

    /// Sets a category score.
    pub fn set(&mut self, category: NsfwCategory, score: f32) {
        self.scores.insert(category, score);
    }

    /// Returns the score for a category, 0.0 when unscored.
    #[must_use]
    pub fn score(&self, category: NsfwCategory) -> f32 {
        self.scores.get(&category).copied().unwrap_or(0.0)
    }

    /// Sums the scores of the given categories.
    #[must_use]
    pub fn inappropriate_score(&self, categories: &[NsfwCategory]) -> f32 {
        categories.iter().map(|&c| self.score(c)).sum()
    }
}

/// A generic semantic label reported for an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelHit {
    /// Label text, e.g. "dress" or "person".
    pub text: String,
    /// Labeler confidence (0.0 to 1.0).
    pub confidence: f32,
}

impl LabelHit {
    /// Creates a label hit.
    #[must_use]
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// A located face paired with its gender estimate, if one was produced.
///
/// The estimate is absent when the classifier failed or was skipped for this
/// face; the decision policy owns how absence is interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceObservation {
    /// The located face.
    pub face: DetectedFace,
    /// Gender estimate, absent on classifier failure or skip.
    pub gender: Option<GenderEstimate>,
}
