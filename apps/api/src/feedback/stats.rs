//! Aggregate statistics, recomputed from the table on every call.

use serde::{Deserialize, Serialize};

use crate::analysis::classifier::SentimentLabel;
use crate::store::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsStatus {
    Ok,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total: usize,
    pub positives: usize,
    pub negatives: usize,
    pub neutrals: usize,
    pub mean_compound: f64,
    pub status: StatsStatus,
}

/// One bar/slice of the dashboard chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelShare {
    pub label: SentimentLabel,
    pub count: usize,
    pub percent: f64,
}

impl Stats {
    pub fn count(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Positive => self.positives,
            SentimentLabel::Negative => self.negatives,
            SentimentLabel::Neutral => self.neutrals,
        }
    }

    /// Per-label counts and percentages of the total (0.0 for an empty table).
    pub fn distribution(&self) -> Vec<LabelShare> {
        SentimentLabel::ALL
            .iter()
            .map(|&label| {
                let count = self.count(label);
                let percent = if self.total == 0 {
                    0.0
                } else {
                    count as f64 * 100.0 / self.total as f64
                };
                LabelShare {
                    label,
                    count,
                    percent,
                }
            })
            .collect()
    }
}

/// Counts per label and the mean compound score. An empty table yields all
/// zeros with `mean_compound == 0.0`.
pub fn aggregate(table: &Table) -> Stats {
    let rows = table.rows();
    let count = |label: SentimentLabel| rows.iter().filter(|r| r.sentiment_label == label).count();

    let mean_compound = if table.is_empty() {
        0.0
    } else {
        rows.iter().map(|r| r.score_compound).sum::<f64>() / table.len() as f64
    };

    Stats {
        total: table.len(),
        positives: count(SentimentLabel::Positive),
        negatives: count(SentimentLabel::Negative),
        neutrals: count(SentimentLabel::Neutral),
        mean_compound,
        status: if table.is_empty() {
            StatsStatus::Empty
        } else {
            StatsStatus::Ok
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::comment::CommentRecord;

    fn row(id: u64, compound: f64, label: SentimentLabel) -> CommentRecord {
        CommentRecord {
            id,
            timestamp: "2024-05-01 10:00:00".to_string(),
            author_name: "Pedro".to_string(),
            author_email: String::new(),
            comment_original: "x".to_string(),
            comment_translated: "x".to_string(),
            score_negative: 0.0,
            score_neutral: 1.0,
            score_positive: 0.0,
            score_compound: compound,
            sentiment_label: label,
        }
    }

    #[test]
    fn test_empty_table_is_all_zero() {
        let stats = aggregate(&Table::default());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.positives, 0);
        assert_eq!(stats.negatives, 0);
        assert_eq!(stats.neutrals, 0);
        assert_eq!(stats.mean_compound, 0.0);
        assert_eq!(stats.status, StatsStatus::Empty);
    }

    #[test]
    fn test_counts_and_mean() {
        let table = Table::new(vec![
            row(1, 0.8, SentimentLabel::Positive),
            row(2, -0.4, SentimentLabel::Negative),
            row(3, 0.0, SentimentLabel::Neutral),
            row(4, 0.6, SentimentLabel::Positive),
        ]);
        let stats = aggregate(&table);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.positives, 2);
        assert_eq!(stats.negatives, 1);
        assert_eq!(stats.neutrals, 1);
        assert!((stats.mean_compound - 0.25).abs() < 1e-12);
        assert_eq!(stats.status, StatsStatus::Ok);
    }

    #[test]
    fn test_missing_category_counts_zero() {
        let table = Table::new(vec![row(1, 0.9, SentimentLabel::Positive)]);
        let stats = aggregate(&table);
        assert_eq!(stats.negatives, 0);
        assert_eq!(stats.neutrals, 0);
    }

    #[test]
    fn test_distribution_percentages() {
        let table = Table::new(vec![
            row(1, 0.8, SentimentLabel::Positive),
            row(2, 0.7, SentimentLabel::Positive),
            row(3, 0.0, SentimentLabel::Neutral),
            row(4, -0.6, SentimentLabel::Negative),
        ]);
        let shares = aggregate(&table).distribution();
        assert_eq!(shares.len(), 3);
        assert_eq!(shares[0].label, SentimentLabel::Positive);
        assert_eq!(shares[0].percent, 50.0);
        assert_eq!(shares[1].percent, 25.0);
    }

    #[test]
    fn test_distribution_of_empty_table() {
        let shares = aggregate(&Table::default()).distribution();
        assert!(shares.iter().all(|s| s.count == 0 && s.percent == 0.0));
    }
}
