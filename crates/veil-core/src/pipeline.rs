//! Async orchestration of the collaborator models around the decision core.
//!
//! `ImageModerator` is the single public entry point: it gates every request
//! through the decision cache, fans the collaborator calls out concurrently,
//! and hands the collected signals to [`policy::evaluate`]. Collaborators
//! are injected at construction and owned by the host; the moderator only
//! holds shared references.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::cache::{DecisionCache, DecisionKey};
use crate::crop::face_crop;
use crate::domain::{
    DetectedFace, FaceObservation, ModerationDecision, ModerationSettings, NsfwScores, SourceImage,
};
use crate::error::ModerationError;
use crate::policy;
use crate::ports::{FaceLocator, GenderClassifier, LabelAnalyzer, NsfwClassifier};

#[derive(Clone)]
struct Collaborators {
    face_locator: Arc<dyn FaceLocator>,
    gender_classifier: Arc<dyn GenderClassifier>,
    nsfw_classifier: Arc<dyn NsfwClassifier>,
    label_analyzer: Option<Arc<dyn LabelAnalyzer>>,
}

/// Orchestrates detection, classification, and the decision policy for one
/// image at a time, deduplicating concurrent requests per image+settings.
pub struct ImageModerator {
    collaborators: Collaborators,
    cache: DecisionCache,
}

impl ImageModerator {
    /// Creates a moderator over the given collaborators.
    #[must_use]
    pub fn new(
        face_locator: Arc<dyn FaceLocator>,
        gender_classifier: Arc<dyn GenderClassifier>,
        nsfw_classifier: Arc<dyn NsfwClassifier>,
    ) -> Self {
        Self {
            collaborators: Collaborators {
                face_locator,
                gender_classifier,
                nsfw_classifier,
                label_analyzer: None,
            },
            cache: DecisionCache::default(),
        }
    }

    /// Attaches the optional label analyzer.
    #[must_use]
    pub fn with_label_analyzer(mut self, analyzer: Arc<dyn LabelAnalyzer>) -> Self {
        self.collaborators.label_analyzer = Some(analyzer);
        self
    }

    /// Replaces the decision cache with one of the given capacity.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = DecisionCache::new(capacity);
        self
    }

    /// Decides whether `image` should be blurred under `settings`.
    ///
    /// Repeated and concurrent calls for the same image content and settings
    /// share one evaluation; collaborator failures degrade to absent signals
    /// rather than surfacing here.
    ///
    /// # Errors
    ///
    /// Returns [`ModerationError::InvalidInput`] for a zero-area image.
    pub async fn moderate(
        &self,
        image: &SourceImage,
        settings: &ModerationSettings,
    ) -> Result<Arc<ModerationDecision>, ModerationError> {
        if image.width == 0 || image.height == 0 {
            return Err(ModerationError::InvalidInput(format!(
                "zero-area image: {}",
                image.uri
            )));
        }

        let key = DecisionKey {
            image: image.content_fingerprint(),
            settings: settings.fingerprint(),
        };
        let collaborators = self.collaborators.clone();
        let image = image.clone();
        let settings = settings.clone();

        self.cache
            .get_or_compute(key, move || async move {
                Ok(Arc::new(
                    compute_decision(&collaborators, &image, &settings).await,
                ))
            })
            .await
    }
}

/// Outcome of the NSFW signal fetch. Failure is kept distinct from the
/// signal being switched off: strict mode treats only failure conservatively.
enum NsfwSignal {
    Scores(NsfwScores),
    Disabled,
    Failed,
}

impl NsfwSignal {
    fn scores(&self) -> Option<&NsfwScores> {
        match self {
            Self::Scores(scores) => Some(scores),
            Self::Disabled | Self::Failed => None,
        }
    }
}

async fn compute_decision(
    collaborators: &Collaborators,
    image: &SourceImage,
    settings: &ModerationSettings,
) -> ModerationDecision {
    debug!(uri = %image.uri, "evaluating image");

    // Primary signals have no ordering dependency between them.
    let (nsfw_signal, located) = tokio::join!(
        fetch_nsfw(collaborators, image, settings),
        collaborators.face_locator.locate(image.image()),
    );

    if matches!(nsfw_signal, NsfwSignal::Failed) && settings.strict_mode {
        return degraded_decision(None, settings);
    }
    let nsfw = nsfw_signal.scores();

    let faces = match located {
        Ok(faces) => faces,
        Err(error) => {
            warn!(uri = %image.uri, %error, "face locator failed, degrading");
            return degraded_decision(nsfw, settings);
        }
    };
    debug!(uri = %image.uri, count = faces.len(), "faces located");

    let gate_fires = nsfw.is_some_and(|scores| {
        scores.inappropriate_score(&settings.nsfw_categories) > settings.nsfw_threshold
    });

    let observations = if gate_fires {
        // The verdict is already decided; skip gender inference entirely.
        faces
            .into_iter()
            .map(|face| FaceObservation { face, gender: None })
            .collect()
    } else {
        classify_faces(collaborators, image, settings, faces).await
    };

    let decision = policy::evaluate(&observations, nsfw, &[], settings);
    if decision.should_blur {
        return decision;
    }

    // The labeler is a fallback signal, only worth its latency for images
    // the primary signals allowed.
    let Some(analyzer) = &collaborators.label_analyzer else {
        return decision;
    };
    let labels = match analyzer.analyze(image.image()).await {
        Ok(labels) => labels,
        Err(error) => {
            warn!(uri = %image.uri, %error, "label analyzer unavailable, signal absent");
            return decision;
        }
    };
    if labels.is_empty() {
        return decision;
    }
    policy::evaluate(&observations, nsfw, &labels, settings)
}

async fn fetch_nsfw(
    collaborators: &Collaborators,
    image: &SourceImage,
    settings: &ModerationSettings,
) -> NsfwSignal {
    if !settings.use_nsfw_detection {
        return NsfwSignal::Disabled;
    }
    match collaborators.nsfw_classifier.classify(image.image()).await {
        Ok(scores) => NsfwSignal::Scores(scores),
        Err(error) => {
            warn!(uri = %image.uri, %error, "nsfw classifier unavailable, signal absent");
            NsfwSignal::Failed
        }
    }
}

/// Runs gender classification concurrently across faces; every estimate (or
/// its absence) is collected before the policy runs.
async fn classify_faces(
    collaborators: &Collaborators,
    image: &SourceImage,
    settings: &ModerationSettings,
    faces: Vec<DetectedFace>,
) -> Vec<FaceObservation> {
    let estimates = join_all(faces.iter().map(|face| {
        let crop = face_crop(image.image(), &face.bounding_box, settings.face_padding_fraction);
        let face_id = face.id;
        async move {
            let region = match crop {
                Ok(region) => region,
                Err(error) => {
                    warn!(face = face_id, %error, "unusable face crop, estimate absent");
                    return None;
                }
            };
            match collaborators.gender_classifier.classify(&region).await {
                Ok(mut estimate) => {
                    estimate.face_id = face_id;
                    Some(estimate)
                }
                Err(error) => {
                    warn!(face = face_id, %error, "gender classifier failed, estimate absent");
                    None
                }
            }
        }
    }))
    .await;

    faces
        .into_iter()
        .zip(estimates)
        .map(|(face, gender)| FaceObservation { face, gender })
        .collect()
}

/// Conservative fallback when face location itself fails: a firing NSFW gate
/// still decides first, strict mode blurs, lenient mode allows.
fn degraded_decision(
    nsfw: Option<&NsfwScores>,
    settings: &ModerationSettings,
) -> ModerationDecision {
    let decision = policy::evaluate(&[], nsfw, &[], settings);
    if decision.should_blur || !settings.strict_mode {
        return decision;
    }
    ModerationDecision {
        should_blur: true,
        reason: Some("Processing error in strict mode".to_owned()),
        nsfw_score: decision.nsfw_score,
        ..ModerationDecision::default()
    }
}
