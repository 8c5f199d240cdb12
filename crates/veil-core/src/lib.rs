//! Veil core - multi-signal content-moderation decision engine.
//!
//! Decides, per image, whether to display or obscure it based on detected
//! human presence, apparent gender, and NSFW category scores. Detection and
//! classification backends are external collaborators behind the traits in
//! [`ports`]; this crate owns the decision policy, its configuration, and
//! the per-image concurrency gating.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use veil_core::{ImageModerator, ModerationSettings, SourceImage};
//! # use veil_core::ports::{FaceLocator, GenderClassifier, NsfwClassifier};
//! # async fn run(
//! #     locator: Arc<dyn FaceLocator>,
//! #     gender: Arc<dyn GenderClassifier>,
//! #     nsfw: Arc<dyn NsfwClassifier>,
//! #     image: SourceImage,
//! # ) -> anyhow::Result<()> {
//! let moderator = ImageModerator::new(locator, gender, nsfw);
//! let decision = moderator
//!     .moderate(&image, &ModerationSettings::default())
//!     .await?;
//! if decision.should_blur {
//!     println!("blurred: {}", decision.reason.as_deref().unwrap_or("-"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod crop;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod policy;
pub mod ports;

pub use cache::{DecisionCache, DecisionKey, DEFAULT_CACHE_CAPACITY};
pub use domain::{
    BoundingBox, DetectedFace, FaceObservation, GenderEstimate, KeywordPolicy, LabelHit,
    ModerationDecision, ModerationSettings, NsfwCategory, NsfwScores, SourceImage,
};
pub use error::ModerationError;
pub use pipeline::ImageModerator;
pub use ports::{FaceLocator, GenderClassifier, LabelAnalyzer, NsfwClassifier};
