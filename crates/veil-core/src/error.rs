//! Error taxonomy for the moderation pipeline.

use thiserror::Error;

/// Errors surfaced by the moderation pipeline.
///
/// Collaborator failures are deliberately absent: a classifier that errors is
/// treated as a missing signal and handled by the decision policy, never
/// propagated from [`ImageModerator::moderate`](crate::pipeline::ImageModerator::moderate).
#[derive(Debug, Clone, Error)]
pub enum ModerationError {
    /// The supplied image or face region cannot be evaluated at all.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A shared evaluation failed. The failure reached every caller waiting
    /// on the same cache key, and the key was cleared so a later call
    /// retries from scratch.
    #[error("evaluation failed: {0}")]
    Evaluation(String),
}
