//! Label-keyword fallback matching.
//!
//! Consulted only after the face and NSFW signals allowed an image. Matches
//! configured keyword sets against labeler output, with male indicators
//! acting purely as a suppressor for the female branch.

use tracing::debug;

use crate::domain::{KeywordPolicy, LabelHit};

/// Outcome of the keyword fallback, carrying the formatted reason.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum KeywordVerdict {
    /// Female-indicator labels matched.
    FemaleIndicators(String),
    /// Inappropriate-context labels matched.
    InappropriateContext(String),
}

impl KeywordVerdict {
    pub(crate) fn into_reason(self) -> String {
        match self {
            Self::FemaleIndicators(reason) | Self::InappropriateContext(reason) => reason,
        }
    }
}

/// Scans labels against the keyword policy.
///
/// `check_female` gates the female branch (it mirrors the blur-females
/// setting); the inappropriate-context branch always runs.
pub(crate) fn match_labels(
    labels: &[LabelHit],
    policy: &KeywordPolicy,
    check_female: bool,
) -> Option<KeywordVerdict> {
    let female_hits: Vec<&LabelHit> = labels
        .iter()
        .filter(|label| {
            label.confidence > policy.female_confidence_threshold
                && matches_any(&label.text, &policy.female_indicators)
        })
        .collect();

    let male_present = labels.iter().any(|label| {
        label.confidence > policy.male_confidence_threshold
            && matches_any(&label.text, &policy.male_indicators)
    });

    if check_female {
        if male_present && female_hits.is_empty() {
            debug!("male indicators present without female indicators, skipping female branch");
        } else if !female_hits.is_empty() {
            return Some(KeywordVerdict::FemaleIndicators(format!(
                "Female indicators: {}",
                format_hits(&female_hits)
            )));
        }
    }

    let inappropriate_hits: Vec<&LabelHit> = labels
        .iter()
        .filter(|label| {
            label.confidence > policy.inappropriate_confidence_threshold
                && matches_any(&label.text, &policy.inappropriate_keywords)
        })
        .collect();

    if inappropriate_hits.is_empty() {
        None
    } else {
        Some(KeywordVerdict::InappropriateContext(format!(
            "Content contains: {}",
            format_hits(&inappropriate_hits)
        )))
    }
}

/// Case-insensitive substring match against any keyword in the set.
fn matches_any(text: &str, keywords: &[String]) -> bool {
    let text = text.to_lowercase();
    keywords.iter().any(|kw| text.contains(&kw.to_lowercase()))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn format_hits(hits: &[&LabelHit]) -> String {
    hits.iter()
        .map(|label| format!("{} ({}%)", label.text, (label.confidence * 100.0) as u32))
        .collect::<Vec<_>>()
        .join(", ")
}
