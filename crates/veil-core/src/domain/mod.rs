//! Core domain types for the moderation decision engine.

mod decision;
mod detection;
mod settings;
mod source;

pub use decision::ModerationDecision;
pub use detection::{
    BoundingBox, DetectedFace, FaceObservation, GenderEstimate, LabelHit, NsfwCategory, NsfwScores,
};
pub use settings::{KeywordPolicy, ModerationSettings};
pub use source::SourceImage;
