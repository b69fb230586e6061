use std::fmt;

use serde::{Deserialize, Serialize};

/// Compound scores at or above this are positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound scores at or below this are negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Discrete sentiment category stored with every comment.
///
/// Rows written by the first Spanish-language release used `Positivo`,
/// `Negativo` and `Neutro`; those still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    #[serde(alias = "Positivo")]
    Positive,
    #[serde(alias = "Negativo")]
    Negative,
    #[serde(alias = "Neutro")]
    Neutral,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a compound score to its label. Total over all floats; NaN is neutral.
pub fn classify(compound: f64) -> SentimentLabel {
    if compound >= POSITIVE_THRESHOLD {
        SentimentLabel::Positive
    } else if compound <= NEGATIVE_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundaries_are_inclusive() {
        assert_eq!(classify(0.05), SentimentLabel::Positive);
        assert_eq!(classify(-0.05), SentimentLabel::Negative);
    }

    #[test]
    fn test_just_inside_band_is_neutral() {
        assert_eq!(classify(0.04999), SentimentLabel::Neutral);
        assert_eq!(classify(-0.04999), SentimentLabel::Neutral);
        assert_eq!(classify(0.0), SentimentLabel::Neutral);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(classify(1.0), SentimentLabel::Positive);
        assert_eq!(classify(-1.0), SentimentLabel::Negative);
    }

    #[test]
    fn test_nan_is_neutral() {
        assert_eq!(classify(f64::NAN), SentimentLabel::Neutral);
    }

    #[test]
    fn test_legacy_spanish_labels_deserialize() {
        let label: SentimentLabel = serde_json::from_str("\"Positivo\"").unwrap();
        assert_eq!(label, SentimentLabel::Positive);
        let label: SentimentLabel = serde_json::from_str("\"Neutro\"").unwrap();
        assert_eq!(label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_serializes_english_names() {
        assert_eq!(
            serde_json::to_string(&SentimentLabel::Negative).unwrap(),
            "\"Negative\""
        );
    }
}
