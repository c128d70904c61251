//! Analysis result and the label enumerations it is drawn from.
//!
//! - [`AnalysisResult`]: the `{emotion, age, gender}` triple sent to peers
//! - [`LabelSet`]: the configured emotion/gender enumerations and age bounds

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of analyzing one frame.
///
/// Serializes to a JSON object with exactly the fields `emotion`, `age` and
/// `gender`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisResult {
    /// Emotion label, one of [`LabelSet::emotions`].
    pub emotion: String,
    /// Estimated age in years.
    pub age: u8,
    /// Gender label, one of [`LabelSet::genders`].
    pub gender: String,
}

impl AnalysisResult {
    /// Creates a new analysis result.
    pub fn new(emotion: impl Into<String>, age: u8, gender: impl Into<String>) -> Self {
        Self {
            emotion: emotion.into(),
            age,
            gender: gender.into(),
        }
    }

    /// Returns true if every field lies within the given label set.
    pub fn conforms_to(&self, labels: &LabelSet) -> bool {
        labels.has_emotion(&self.emotion)
            && labels.has_gender(&self.gender)
            && labels.contains_age(self.age)
    }
}

/// Errors produced when validating a [`LabelSet`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelSetError {
    /// No emotion labels configured.
    #[error("emotion labels must not be empty")]
    NoEmotions,

    /// No gender labels configured.
    #[error("gender labels must not be empty")]
    NoGenders,

    /// A label is empty or whitespace.
    #[error("labels must not be blank")]
    BlankLabel,

    /// Age bounds are inverted.
    #[error("invalid age range: {min}..={max}")]
    InvalidAgeRange { min: u8, max: u8 },
}

/// The closed enumerations an analyzer draws its labels from.
///
/// The exact labels are a deployment choice. The default set matches what
/// the Humora frontend renders and scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSet {
    /// Emotion labels.
    pub emotions: Vec<String>,
    /// Gender labels.
    pub genders: Vec<String>,
    /// Lowest age an analyzer may report.
    pub min_age: u8,
    /// Highest age an analyzer may report.
    pub max_age: u8,
}

impl Default for LabelSet {
    fn default() -> Self {
        Self {
            emotions: to_strings(&[
                "Radość 😃",
                "Smutek 😔",
                "Złość 😠",
                "Neutralny 😐",
                "Zaskoczenie 😲",
            ]),
            genders: to_strings(&["Kobieta", "Mężczyzna"]),
            min_age: 18,
            max_age: 60,
        }
    }
}

impl LabelSet {
    /// English labels with the default age bounds.
    pub fn english() -> Self {
        Self {
            emotions: to_strings(&["Happiness", "Sadness", "Anger", "Neutral", "Surprise"]),
            genders: to_strings(&["Female", "Male"]),
            ..Self::default()
        }
    }

    /// Builder: set emotion labels.
    #[must_use]
    pub fn with_emotions<I, S>(mut self, emotions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emotions = emotions.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set gender labels.
    #[must_use]
    pub fn with_genders<I, S>(mut self, genders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genders = genders.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set the age bounds (inclusive).
    #[must_use]
    pub fn with_age_range(mut self, min_age: u8, max_age: u8) -> Self {
        self.min_age = min_age;
        self.max_age = max_age;
        self
    }

    /// Checks that the set can actually produce results.
    pub fn validate(&self) -> Result<(), LabelSetError> {
        if self.emotions.is_empty() {
            return Err(LabelSetError::NoEmotions);
        }
        if self.genders.is_empty() {
            return Err(LabelSetError::NoGenders);
        }
        if self
            .emotions
            .iter()
            .chain(self.genders.iter())
            .any(|label| label.trim().is_empty())
        {
            return Err(LabelSetError::BlankLabel);
        }
        if self.min_age > self.max_age {
            return Err(LabelSetError::InvalidAgeRange {
                min: self.min_age,
                max: self.max_age,
            });
        }
        Ok(())
    }

    /// Returns true if `emotion` is one of the configured labels.
    pub fn has_emotion(&self, emotion: &str) -> bool {
        self.emotions.iter().any(|e| e == emotion)
    }

    /// Returns true if `gender` is one of the configured labels.
    pub fn has_gender(&self, gender: &str) -> bool {
        self.genders.iter().any(|g| g == gender)
    }

    /// Returns true if `age` lies within the configured bounds.
    pub fn contains_age(&self, age: u8) -> bool {
        (self.min_age..=self.max_age).contains(&age)
    }
}

fn to_strings(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| (*s).to_string()).collect()
}
