//! The decision core: fuses per-face and per-image signals into one verdict.
//!
//! [`evaluate`] is a pure function over already-computed model outputs; it
//! performs no I/O and never fails. Signals are consulted in a fixed
//! first-match-wins order:
//!
//! 1. NSFW gate over the summed category scores;
//! 2. per-face gender tally (strict mode resolves uncertainty toward female);
//! 3. blur verdict from the tally;
//! 4. label-keyword fallback;
//! 5. default allow.
//!
//! The ordering is load-bearing: NSFW content is blurred regardless of who is
//! in the image, and the keyword fallback only ever fires for images the
//! primary signals allowed.

mod keywords;

use tracing::debug;

use crate::domain::{
    FaceObservation, LabelHit, ModerationDecision, ModerationSettings, NsfwScores,
};

/// Fuses the collected signals into a single decision.
///
/// Missing signals degrade gracefully: an absent NSFW vector skips the gate,
/// a face without a gender estimate is counted in `faces_detected` but (in
/// lenient mode) excluded from the tallies, and an empty label list skips the
/// fallback. In strict mode, absence resolves toward blurring.
#[must_use]
pub fn evaluate(
    faces: &[FaceObservation],
    nsfw: Option<&NsfwScores>,
    labels: &[LabelHit],
    settings: &ModerationSettings,
) -> ModerationDecision {
    let nsfw_score = nsfw
        .map(|scores| scores.inappropriate_score(&settings.nsfw_categories))
        .unwrap_or(0.0);

    // NSFW content is blurred regardless of who is in the image.
    if nsfw.is_some() && nsfw_score > settings.nsfw_threshold {
        debug!(nsfw_score, "nsfw gate fired");
        return ModerationDecision {
            should_blur: true,
            reason: Some("Inappropriate content detected".to_owned()),
            faces_detected: faces.len(),
            nsfw_score,
            is_nsfw: true,
            ..ModerationDecision::default()
        };
    }

    let tally = tally_faces(faces, settings);

    let should_blur = (settings.blur_females && tally.females > 0)
        || (settings.blur_males && tally.males > 0)
        || (settings.strict_mode && tally.uncertain > 0);

    let per_face_gender: Vec<_> = faces.iter().filter_map(|obs| obs.gender).collect();

    let mut decision = ModerationDecision {
        should_blur,
        reason: None,
        faces_detected: faces.len(),
        females_detected: tally.females,
        males_detected: tally.males,
        uncertain_faces: tally.uncertain,
        nsfw_score,
        is_nsfw: false,
        per_face_gender,
    };

    if should_blur {
        decision.reason = Some(tally_reason(&tally, settings));
        return decision;
    }

    // Fallback: consult labeler output only for otherwise-allowed images.
    if !labels.is_empty() {
        if let Some(verdict) =
            keywords::match_labels(labels, &settings.keywords, settings.blur_females)
        {
            debug!(?verdict, "label keyword fallback fired");
            decision.should_blur = true;
            decision.reason = Some(verdict.into_reason());
        }
    }

    decision
}

struct GenderTally {
    females: usize,
    males: usize,
    uncertain: usize,
}

fn tally_faces(faces: &[FaceObservation], settings: &ModerationSettings) -> GenderTally {
    let mut tally = GenderTally {
        females: 0,
        males: 0,
        uncertain: 0,
    };

    for obs in faces {
        match obs.gender {
            Some(estimate) if estimate.confidence < settings.gender_confidence_threshold => {
                tally.uncertain += 1;
                if settings.strict_mode {
                    // Uncertainty resolves toward female, the blurred class.
                    tally.females += 1;
                }
            }
            Some(estimate) => {
                debug!(
                    face = obs.face.id,
                    is_female = estimate.is_female,
                    confidence = estimate.confidence,
                    "face tallied"
                );
                if estimate.is_female {
                    tally.females += 1;
                } else {
                    tally.males += 1;
                }
            }
            None => {
                if settings.strict_mode {
                    tally.uncertain += 1;
                    tally.females += 1;
                }
                // Lenient mode: the face still counts toward faces_detected,
                // just not toward any gender tally.
            }
        }
    }

    tally
}

/// Reason priority: female count, then male count, then strict-mode
/// uncertainty. The counts are reported even when a lower-priority rule was
/// the one that actually tripped the blur.
fn tally_reason(tally: &GenderTally, settings: &ModerationSettings) -> String {
    if tally.females > 0 {
        format!("Detected {} female face(s)", tally.females)
    } else if tally.males > 0 {
        format!("Detected {} male face(s)", tally.males)
    } else if settings.strict_mode {
        "Uncertain detection in strict mode".to_owned()
    } else {
        // Unreachable with the current blur rules; kept total for safety.
        "Face detection triggered".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BoundingBox, DetectedFace, GenderEstimate, LabelHit, NsfwCategory, NsfwScores,
    };

    fn face(id: u32) -> DetectedFace {
        DetectedFace {
            id,
            bounding_box: BoundingBox::new(10, 10, 60, 60),
            locator_confidence: 0.9,
        }
    }

    fn observed(id: u32, is_female: bool, confidence: f32) -> FaceObservation {
        FaceObservation {
            face: face(id),
            gender: Some(GenderEstimate {
                face_id: id,
                is_female,
                confidence,
            }),
        }
    }

    fn unobserved(id: u32) -> FaceObservation {
        FaceObservation {
            face: face(id),
            gender: None,
        }
    }

    #[test]
    fn test_no_signals_no_blur() {
        let decision = evaluate(&[], None, &[], &ModerationSettings::default());
        assert!(!decision.should_blur);
        assert_eq!(decision.reason, None);
        assert_eq!(decision.faces_detected, 0);
        assert!(!decision.is_nsfw);
    }

    #[test]
    fn test_nsfw_gate_short_circuits() {
        // Scenario: porn at 0.5 against a 0.3 threshold.
        let nsfw = NsfwScores::new().with_score(NsfwCategory::Porn, 0.5);
        let faces = vec![observed(1, false, 0.95)];

        let decision = evaluate(&faces, Some(&nsfw), &[], &ModerationSettings::default());

        assert!(decision.should_blur);
        assert!(decision.is_nsfw);
        assert_eq!(decision.reason.as_deref(), Some("Inappropriate content detected"));
        assert!((decision.nsfw_score - 0.5).abs() < f32::EPSILON);
        // Gender signals are not consulted on the gate path.
        assert_eq!(decision.females_detected, 0);
        assert_eq!(decision.males_detected, 0);
        assert!(decision.per_face_gender.is_empty());
        // The located faces are still reported.
        assert_eq!(decision.faces_detected, 1);
    }

    #[test]
    fn test_nsfw_sums_configured_categories() {
        let nsfw = NsfwScores::new()
            .with_score(NsfwCategory::Sexy, 0.2)
            .with_score(NsfwCategory::Hentai, 0.15);

        let decision = evaluate(&[], Some(&nsfw), &[], &ModerationSettings::default());

        assert!(decision.should_blur);
        assert!((decision.nsfw_score - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_nsfw_at_threshold_does_not_fire() {
        // The gate is strictly-greater-than.
        let nsfw = NsfwScores::new().with_score(NsfwCategory::Porn, 0.3);
        let decision = evaluate(&[], Some(&nsfw), &[], &ModerationSettings::default());
        assert!(!decision.should_blur);
        assert!(!decision.is_nsfw);
        assert!((decision.nsfw_score - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_female_face_blurs_by_default() {
        // Scenario: one confident female face, default settings.
        let faces = vec![observed(1, true, 0.9)];
        let decision = evaluate(&faces, None, &[], &ModerationSettings::default());

        assert!(decision.should_blur);
        assert_eq!(decision.females_detected, 1);
        assert_eq!(decision.males_detected, 0);
        assert_eq!(decision.reason.as_deref(), Some("Detected 1 female face(s)"));
        assert_eq!(decision.per_face_gender.len(), 1);
    }

    #[test]
    fn test_male_face_allowed_by_default() {
        // Scenario: one confident male face, default settings.
        let faces = vec![observed(1, false, 0.9)];
        let decision = evaluate(&faces, None, &[], &ModerationSettings::default());

        assert!(!decision.should_blur);
        assert_eq!(decision.males_detected, 1);
        assert_eq!(decision.reason, None);
    }

    #[test]
    fn test_male_face_blurs_when_configured() {
        let settings = ModerationSettings::default().with_blur_males(true);
        let faces = vec![observed(1, false, 0.9)];
        let decision = evaluate(&faces, None, &[], &settings);

        assert!(decision.should_blur);
        assert_eq!(decision.reason.as_deref(), Some("Detected 1 male face(s)"));
    }

    #[test]
    fn test_female_count_exact() {
        let faces = vec![
            observed(1, true, 0.9),
            observed(2, true, 0.7),
            observed(3, false, 0.8),
        ];
        let decision = evaluate(&faces, None, &[], &ModerationSettings::default());

        assert!(decision.should_blur);
        assert_eq!(decision.females_detected, 2);
        assert_eq!(decision.males_detected, 1);
        assert_eq!(decision.reason.as_deref(), Some("Detected 2 female face(s)"));
    }

    #[test]
    fn test_low_confidence_is_uncertain_lenient() {
        // Scenario: below-threshold estimate outside strict mode.
        let faces = vec![observed(1, true, 0.4)];
        let decision = evaluate(&faces, None, &[], &ModerationSettings::default());

        assert!(!decision.should_blur);
        assert_eq!(decision.uncertain_faces, 1);
        assert_eq!(decision.females_detected, 0);
        assert_eq!(decision.faces_detected, 1);
    }

    #[test]
    fn test_low_confidence_blurs_in_strict_mode() {
        // Scenario: below-threshold estimate, strict mode tallies it female.
        let settings = ModerationSettings::default().with_strict_mode(true);
        let faces = vec![observed(1, true, 0.4)];
        let decision = evaluate(&faces, None, &[], &settings);

        assert!(decision.should_blur);
        assert_eq!(decision.uncertain_faces, 1);
        assert_eq!(decision.females_detected, 1);
        assert_eq!(decision.reason.as_deref(), Some("Detected 1 female face(s)"));
    }

    #[test]
    fn test_absent_estimate_lenient_counts_face_only() {
        let faces = vec![unobserved(1), observed(2, false, 0.9)];
        let decision = evaluate(&faces, None, &[], &ModerationSettings::default());

        assert!(!decision.should_blur);
        assert_eq!(decision.faces_detected, 2);
        assert_eq!(decision.males_detected, 1);
        assert_eq!(decision.females_detected, 0);
        assert_eq!(decision.uncertain_faces, 0);
        assert_eq!(decision.per_face_gender.len(), 1);
    }

    #[test]
    fn test_absent_estimate_strict_tallies_female() {
        let settings = ModerationSettings::default().with_strict_mode(true);
        let faces = vec![unobserved(1)];
        let decision = evaluate(&faces, None, &[], &settings);

        assert!(decision.should_blur);
        assert_eq!(decision.uncertain_faces, 1);
        assert_eq!(decision.females_detected, 1);
    }

    #[test]
    fn test_strict_reason_without_female_tally() {
        // Strict uncertainty with the female branch disabled still blurs,
        // and the reason names the uncertainty.
        let settings = ModerationSettings::default()
            .with_strict_mode(true)
            .with_blur_females(false);
        let faces = vec![observed(1, false, 0.3)];
        let decision = evaluate(&faces, None, &[], &settings);

        assert!(decision.should_blur);
        // Strict mode tallied the uncertain face as female, so the reason
        // reports the female count.
        assert_eq!(decision.reason.as_deref(), Some("Detected 1 female face(s)"));
    }

    #[test]
    fn test_label_fallback_alcohol() {
        // Scenario: no faces, no NSFW vector, one alcohol label.
        let labels = vec![LabelHit::new("alcohol", 0.8)];
        let decision = evaluate(&[], None, &labels, &ModerationSettings::default());

        assert!(decision.should_blur);
        let reason = decision.reason.expect("reason set");
        assert!(reason.contains("alcohol"), "reason: {reason}");
    }

    #[test]
    fn test_label_fallback_not_consulted_when_tally_blurs() {
        let faces = vec![observed(1, true, 0.9)];
        let labels = vec![LabelHit::new("alcohol", 0.8)];
        let decision = evaluate(&faces, None, &labels, &ModerationSettings::default());

        // The tally reason wins; the label match is never consulted.
        assert_eq!(decision.reason.as_deref(), Some("Detected 1 female face(s)"));
    }

    #[test]
    fn test_label_fallback_skipped_without_labels() {
        let decision = evaluate(&[], None, &[], &ModerationSettings::default());
        assert!(!decision.should_blur);
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let faces = vec![observed(1, true, 0.9), unobserved(2)];
        let nsfw = NsfwScores::new().with_score(NsfwCategory::Sexy, 0.1);
        let labels = vec![LabelHit::new("dress", 0.7)];
        let settings = ModerationSettings::default();

        let first = evaluate(&faces, Some(&nsfw), &labels, &settings);
        let second = evaluate(&faces, Some(&nsfw), &labels, &settings);
        assert_eq!(first, second);
    }

    #[test]
    fn test_nsfw_score_recorded_when_gate_silent() {
        let nsfw = NsfwScores::new().with_score(NsfwCategory::Sexy, 0.2);
        let faces = vec![observed(1, true, 0.9)];
        let decision = evaluate(&faces, Some(&nsfw), &[], &ModerationSettings::default());

        assert!(decision.should_blur);
        assert!(!decision.is_nsfw);
        assert!((decision.nsfw_score - 0.2).abs() < f32::EPSILON);
    }
}
