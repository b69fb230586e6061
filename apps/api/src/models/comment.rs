use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::analysis::classifier::{classify, SentimentLabel};
use crate::analysis::pipeline::Analysis;

/// Stored creation-time format. Lexicographic order equals chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Author name used when the submitter leaves it blank.
pub const ANONYMOUS: &str = "Anonymous";

/// The fixed dataset schema, in column order.
pub const COLUMNS: [&str; 11] = [
    "id",
    "timestamp",
    "author_name",
    "author_email",
    "comment_original",
    "comment_translated",
    "score_negative",
    "score_neutral",
    "score_positive",
    "score_compound",
    "sentiment_label",
];

/// One analyzed comment. Field order matches `COLUMNS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: u64,
    pub timestamp: String,
    pub author_name: String,
    pub author_email: String,
    pub comment_original: String,
    pub comment_translated: String,
    pub score_negative: f64,
    pub score_neutral: f64,
    pub score_positive: f64,
    pub score_compound: f64,
    pub sentiment_label: SentimentLabel,
}

impl CommentRecord {
    /// Assembles a record from pipeline output. A blank name becomes `ANONYMOUS`.
    pub fn from_analysis(
        id: u64,
        created_at: NaiveDateTime,
        author_name: &str,
        author_email: &str,
        analysis: Analysis,
    ) -> Self {
        let author_name = match author_name.trim() {
            "" => ANONYMOUS.to_string(),
            name => name.to_string(),
        };
        Self {
            id,
            timestamp: created_at.format(TIMESTAMP_FORMAT).to_string(),
            author_name,
            author_email: author_email.trim().to_string(),
            comment_original: analysis.original,
            comment_translated: analysis.translated,
            score_negative: analysis.scores.neg,
            score_neutral: analysis.scores.neu,
            score_positive: analysis.scores.pos,
            score_compound: analysis.scores.compound,
            sentiment_label: analysis.label,
        }
    }

    /// Whether the stored label still agrees with the stored compound score.
    pub fn label_is_consistent(&self) -> bool {
        classify(self.score_compound) == self.sentiment_label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::vader::PolarityScores;
    use chrono::NaiveDate;

    fn analysis(compound: f64, label: SentimentLabel) -> Analysis {
        Analysis {
            original: "Los buses están limpios".to_string(),
            translated: "The buses are clean".to_string(),
            scores: PolarityScores {
                neg: 0.0,
                neu: 0.6,
                pos: 0.4,
                compound,
            },
            label,
        }
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(8, 5, 0)
            .unwrap()
    }

    #[test]
    fn test_from_analysis_copies_scores() {
        let r = CommentRecord::from_analysis(
            7,
            at(),
            "Ana",
            "ana@ejemplo.com",
            analysis(0.4019, SentimentLabel::Positive),
        );
        assert_eq!(r.id, 7);
        assert_eq!(r.timestamp, "2024-03-09 08:05:00");
        assert_eq!(r.comment_original, "Los buses están limpios");
        assert_eq!(r.comment_translated, "The buses are clean");
        assert_eq!(r.score_positive, 0.4);
        assert_eq!(r.score_compound, 0.4019);
        assert_eq!(r.sentiment_label, SentimentLabel::Positive);
    }

    #[test]
    fn test_blank_name_defaults_to_anonymous() {
        let r = CommentRecord::from_analysis(1, at(), "  ", "", analysis(0.0, SentimentLabel::Neutral));
        assert_eq!(r.author_name, ANONYMOUS);
        assert_eq!(r.author_email, "");
    }

    #[test]
    fn test_label_consistency_check() {
        let mut r =
            CommentRecord::from_analysis(1, at(), "Luis", "", analysis(0.3, SentimentLabel::Positive));
        assert!(r.label_is_consistent());
        r.sentiment_label = SentimentLabel::Negative;
        assert!(!r.label_is_consistent());
    }
}
