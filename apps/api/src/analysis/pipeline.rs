//! Sentiment pipeline: normalize → score → classify.
//!
//! The single analysis path used for user submissions and dataset seeding.

use std::sync::Arc;

use serde::Serialize;

use crate::analysis::classifier::{classify, SentimentLabel};
use crate::analysis::normalizer::TextNormalizer;
use crate::analysis::vader::{PolarityScorer, PolarityScores};

/// Scores and label for one comment, alongside the text that was scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub original: String,
    pub translated: String,
    pub scores: PolarityScores,
    pub label: SentimentLabel,
}

/// Stateless after construction; shared across requests behind an `Arc`.
pub struct SentimentPipeline {
    normalizer: TextNormalizer,
    scorer: Arc<dyn PolarityScorer>,
}

impl SentimentPipeline {
    pub fn new(normalizer: TextNormalizer, scorer: Arc<dyn PolarityScorer>) -> Self {
        Self { normalizer, scorer }
    }

    pub async fn analyze(&self, text: &str) -> Analysis {
        if text.trim().is_empty() {
            return Analysis {
                original: text.to_string(),
                translated: text.to_string(),
                scores: PolarityScores::NEUTRAL,
                label: SentimentLabel::Neutral,
            };
        }

        let translated = self.normalizer.normalize(text).await;
        let scores = self.scorer.polarity_scores(&translated);

        Analysis {
            original: text.to_string(),
            label: classify(scores.compound),
            translated,
            scores,
        }
    }
}
