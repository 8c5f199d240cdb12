//! Mock implementations of the collaborator ports.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::bail;
use async_trait::async_trait;
use image::DynamicImage;

use veil_core::domain::{DetectedFace, GenderEstimate, LabelHit, NsfwCategory, NsfwScores};
use veil_core::ports::{FaceLocator, GenderClassifier, LabelAnalyzer, NsfwClassifier};

fn bump(counter: &Arc<Mutex<usize>>) {
    *counter.lock().unwrap_or_else(PoisonError::into_inner) += 1;
}

fn read(counter: &Arc<Mutex<usize>>) -> usize {
    *counter.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock `FaceLocator` yielding a fixed face list and tracking calls.
pub struct MockFaceLocator {
    faces: Vec<DetectedFace>,
    fail: bool,
    calls: Arc<Mutex<usize>>,
}

impl MockFaceLocator {
    /// Creates a locator that reports the given faces on every call.
    #[must_use]
    pub fn new(faces: Vec<DetectedFace>) -> Self {
        Self {
            faces,
            fail: false,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates a locator that finds no faces.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Creates a locator that errors on every call.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            faces: vec![],
            fail: true,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of `locate` calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        read(&self.calls)
    }
}

#[async_trait]
impl FaceLocator for MockFaceLocator {
    async fn locate(&self, _image: &DynamicImage) -> anyhow::Result<Vec<DetectedFace>> {
        bump(&self.calls);
        if self.fail {
            bail!("face locator offline");
        }
        Ok(self.faces.clone())
    }
}

/// A scripted gender classification outcome, consumed in call order.
#[derive(Debug, Clone, Copy)]
pub enum ScriptedGender {
    /// Female estimate with the given confidence.
    Female(f32),
    /// Male estimate with the given confidence.
    Male(f32),
    /// The classifier errors for this face.
    Fail,
}

/// Mock `GenderClassifier` returning scripted outcomes in call order.
pub struct MockGenderClassifier {
    script: Mutex<VecDeque<ScriptedGender>>,
    calls: Arc<Mutex<usize>>,
}

impl MockGenderClassifier {
    /// Creates a classifier with one scripted outcome per expected call.
    #[must_use]
    pub fn new(script: Vec<ScriptedGender>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates a classifier that must never be called.
    #[must_use]
    pub fn unused() -> Self {
        Self::new(vec![])
    }

    /// Number of `classify` calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        read(&self.calls)
    }
}

#[async_trait]
impl GenderClassifier for MockGenderClassifier {
    async fn classify(&self, _face_crop: &DynamicImage) -> anyhow::Result<GenderEstimate> {
        bump(&self.calls);
        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match next {
            Some(ScriptedGender::Female(confidence)) => Ok(GenderEstimate {
                face_id: 0,
                is_female: true,
                confidence,
            }),
            Some(ScriptedGender::Male(confidence)) => Ok(GenderEstimate {
                face_id: 0,
                is_female: false,
                confidence,
            }),
            Some(ScriptedGender::Fail) => bail!("gender classifier offline"),
            None => bail!("gender classifier script exhausted"),
        }
    }
}

/// Mock `NsfwClassifier` yielding fixed category scores.
pub struct MockNsfwClassifier {
    scores: NsfwScores,
    fail: bool,
    calls: Arc<Mutex<usize>>,
}

impl MockNsfwClassifier {
    /// Creates a classifier that reports the given scores on every call.
    #[must_use]
    pub fn new(scores: NsfwScores) -> Self {
        Self {
            scores,
            fail: false,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates a classifier reporting fully neutral content.
    #[must_use]
    pub fn neutral() -> Self {
        Self::new(NsfwScores::new().with_score(NsfwCategory::Neutral, 1.0))
    }

    /// Creates a classifier that errors on every call.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            scores: NsfwScores::new(),
            fail: true,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of `classify` calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        read(&self.calls)
    }
}

#[async_trait]
impl NsfwClassifier for MockNsfwClassifier {
    async fn classify(&self, _image: &DynamicImage) -> anyhow::Result<NsfwScores> {
        bump(&self.calls);
        if self.fail {
            bail!("nsfw classifier offline");
        }
        Ok(self.scores.clone())
    }
}

/// Mock `LabelAnalyzer` yielding fixed labels.
pub struct MockLabelAnalyzer {
    labels: Vec<LabelHit>,
    fail: bool,
    calls: Arc<Mutex<usize>>,
}

impl MockLabelAnalyzer {
    /// Creates an analyzer that reports the given labels on every call.
    #[must_use]
    pub fn new(labels: Vec<LabelHit>) -> Self {
        Self {
            labels,
            fail: false,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an analyzer that errors on every call.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            labels: vec![],
            fail: true,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of `analyze` calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        read(&self.calls)
    }
}

#[async_trait]
impl LabelAnalyzer for MockLabelAnalyzer {
    async fn analyze(&self, _image: &DynamicImage) -> anyhow::Result<Vec<LabelHit>> {
        bump(&self.calls);
        if self.fail {
            bail!("label analyzer offline");
        }
        Ok(self.labels.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_locator_counts_calls() {
        let locator = MockFaceLocator::empty();
        let image = DynamicImage::new_rgb8(8, 8);

        assert!(locator.locate(&image).await.unwrap().is_empty());
        assert!(locator.locate(&image).await.unwrap().is_empty());
        assert_eq!(locator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_locator_failing() {
        let locator = MockFaceLocator::failing();
        let image = DynamicImage::new_rgb8(8, 8);
        assert!(locator.locate(&image).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_gender_script_order() {
        let classifier =
            MockGenderClassifier::new(vec![ScriptedGender::Female(0.9), ScriptedGender::Male(0.8)]);
        let crop = DynamicImage::new_rgb8(8, 8);

        let first = classifier.classify(&crop).await.unwrap();
        assert!(first.is_female);
        let second = classifier.classify(&crop).await.unwrap();
        assert!(!second.is_female);

        // Script exhausted.
        assert!(classifier.classify(&crop).await.is_err());
        assert_eq!(classifier.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_nsfw_neutral() {
        let classifier = MockNsfwClassifier::neutral();
        let image = DynamicImage::new_rgb8(8, 8);

        let scores = classifier.classify(&image).await.unwrap();
        assert!((scores.score(NsfwCategory::Neutral) - 1.0).abs() < f32::EPSILON);
        assert!(scores.score(NsfwCategory::Porn).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_mock_labels() {
        let analyzer = MockLabelAnalyzer::new(vec![LabelHit::new("person", 0.8)]);
        let image = DynamicImage::new_rgb8(8, 8);

        let labels = analyzer.analyze(&image).await.unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(analyzer.call_count(), 1);
    }
}
