//! Policy configuration.
//!
//! `ModerationSettings` is an immutable value object: constructed once by the
//! host (or defaulted), passed by value into every decision call, never
//! mutated mid-flight. Supports TOML configuration files with defaulted
//! fields and range validation.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use super::NsfwCategory;

/// The enumerated knobs that change the decision policy's behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationSettings {
    /// Blur images containing faces tallied as female.
    pub blur_females: bool,
    /// Blur images containing faces tallied as male.
    pub blur_males: bool,
    /// Run the NSFW classifier at all.
    pub use_nsfw_detection: bool,
    /// NSFW gate fires when the summed category scores strictly exceed this.
    pub nsfw_threshold: f32,
    /// Categories summed into the inappropriate score.
    pub nsfw_categories: Vec<NsfwCategory>,
    /// Gender estimates below this confidence count as uncertain.
    pub gender_confidence_threshold: f32,
    /// Resolve classifier uncertainty toward blurring instead of showing.
    pub strict_mode: bool,
    /// Fraction of the face-box width added as crop padding per side.
    pub face_padding_fraction: f32,
    /// Keyword sets for the label fallback.
    pub keywords: KeywordPolicy,
}

impl Default for ModerationSettings {
    fn default() -> Self {
        Self {
            blur_females: true,
            blur_males: false,
            use_nsfw_detection: true,
            nsfw_threshold: 0.3,
            nsfw_categories: vec![NsfwCategory::Porn, NsfwCategory::Sexy, NsfwCategory::Hentai],
            gender_confidence_threshold: 0.5,
            strict_mode: false,
            face_padding_fraction: 0.1,
            keywords: KeywordPolicy::default(),
        }
    }
}

impl ModerationSettings {
    /// Sets whether female faces trigger a blur.
    #[must_use]
    pub fn with_blur_females(mut self, blur: bool) -> Self {
        self.blur_females = blur;
        self
    }

    /// Sets whether male faces trigger a blur.
    #[must_use]
    pub fn with_blur_males(mut self, blur: bool) -> Self {
        self.blur_males = blur;
        self
    }

    /// Enables or disables the NSFW classifier.
    #[must_use]
    pub fn with_nsfw_detection(mut self, enabled: bool) -> Self {
        self.use_nsfw_detection = enabled;
        self
    }

    /// Sets the NSFW gate threshold.
    #[must_use]
    pub fn with_nsfw_threshold(mut self, threshold: f32) -> Self {
        self.nsfw_threshold = threshold;
        self
    }

    /// Sets the gender confidence threshold.
    #[must_use]
    pub fn with_gender_confidence_threshold(mut self, threshold: f32) -> Self {
        self.gender_confidence_threshold = threshold;
        self
    }

    /// Enables or disables strict mode.
    #[must_use]
    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    /// Sets the face-crop padding fraction.
    #[must_use]
    pub fn with_face_padding_fraction(mut self, fraction: f32) -> Self {
        self.face_padding_fraction = fraction;
        self
    }

    /// Parses settings from a TOML document.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not parse or a value is out of
    /// range.
    pub fn from_toml_str(doc: &str) -> Result<Self> {
        let settings: Self = toml::from_str(doc).context("failed to parse settings")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails validation.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let doc = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file: {}", path.display()))?;
        Self::from_toml_str(&doc)
    }

    /// Checks that all values are within their acceptable ranges.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first out-of-range field.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.nsfw_threshold) {
            bail!("nsfw_threshold must be 0.0-1.0, got {}", self.nsfw_threshold);
        }
        if !(0.0..=1.0).contains(&self.gender_confidence_threshold) {
            bail!(
                "gender_confidence_threshold must be 0.0-1.0, got {}",
                self.gender_confidence_threshold
            );
        }
        if !(0.0..=1.0).contains(&self.face_padding_fraction) {
            bail!(
                "face_padding_fraction must be 0.0-1.0, got {}",
                self.face_padding_fraction
            );
        }
        if self.nsfw_categories.is_empty() && self.use_nsfw_detection {
            bail!("nsfw_categories must not be empty while NSFW detection is enabled");
        }
        self.keywords.validate()
    }

    /// Stable in-process identity of this configuration, for cache keying.
    ///
    /// Two settings values with equal fields share a fingerprint within one
    /// process. Not stable across processes.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.blur_females.hash(&mut hasher);
        self.blur_males.hash(&mut hasher);
        self.use_nsfw_detection.hash(&mut hasher);
        self.nsfw_threshold.to_bits().hash(&mut hasher);
        self.nsfw_categories.hash(&mut hasher);
        self.gender_confidence_threshold.to_bits().hash(&mut hasher);
        self.strict_mode.hash(&mut hasher);
        self.face_padding_fraction.to_bits().hash(&mut hasher);
        self.keywords.hash_into(&mut hasher);
        hasher.finish()
    }
}

/// Keyword sets consulted by the label fallback, with per-class confidence
/// thresholds. Matching is case-insensitive substring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordPolicy {
    /// Labels suggesting female presence.
    pub female_indicators: Vec<String>,
    /// Minimum confidence for a female indicator to count (exclusive).
    pub female_confidence_threshold: f32,
    /// Labels suggesting male presence; matches suppress the female branch
    /// when no female indicator matched.
    pub male_indicators: Vec<String>,
    /// Minimum confidence for a male indicator to count (exclusive).
    pub male_confidence_threshold: f32,
    /// Labels naming inappropriate context (alcohol, gambling, swimwear...).
    pub inappropriate_keywords: Vec<String>,
    /// Minimum confidence for an inappropriate keyword to count (exclusive).
    pub inappropriate_confidence_threshold: f32,
}

impl Default for KeywordPolicy {
    fn default() -> Self {
        Self {
            female_indicators: to_strings(&[
                "woman",
                "women",
                "girl",
                "female",
                "lady",
                "ladies",
                "dress",
                "skirt",
                "blouse",
                "makeup",
                "lipstick",
                "earrings",
                "jewelry",
                "handbag",
                "long hair",
                "hairstyle",
                "ponytail",
                "braid",
            ]),
            female_confidence_threshold: 0.1,
            male_indicators: to_strings(&[
                "man",
                "men",
                "boy",
                "male",
                "gentleman",
                "guy",
                "beard",
                "mustache",
                "facial hair",
                "suit",
                "tie",
                "businessman",
                "father",
                "brother",
            ]),
            male_confidence_threshold: 0.5,
            inappropriate_keywords: to_strings(&[
                "alcohol",
                "wine",
                "beer",
                "liquor",
                "cocktail",
                "pork",
                "bacon",
                "ham",
                "pig",
                "gambling",
                "casino",
                "betting",
                "bikini",
                "swimsuit",
                "underwear",
                "lingerie",
                "nightclub",
                "bar",
                "pub",
            ]),
            inappropriate_confidence_threshold: 0.0,
        }
    }
}

impl KeywordPolicy {
    /// Checks threshold ranges.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first out-of-range threshold.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("female_confidence_threshold", self.female_confidence_threshold),
            ("male_confidence_threshold", self.male_confidence_threshold),
            (
                "inappropriate_confidence_threshold",
                self.inappropriate_confidence_threshold,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} must be 0.0-1.0, got {value}");
            }
        }
        Ok(())
    }

    pub(crate) fn hash_into(&self, hasher: &mut impl Hasher) {
        self.female_indicators.hash(hasher);
        self.female_confidence_threshold.to_bits().hash(hasher);
        self.male_indicators.hash(hasher);
        self.male_confidence_threshold.to_bits().hash(hasher);
        self.inappropriate_keywords.hash(hasher);
        self.inappropriate_confidence_threshold.to_bits().hash(hasher);
    }
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_owned()).collect()
}
