//! Feedback service: the core facade used by the HTTP layer.
//!
//! submit: validate → analyze → build record → append (under the store lock).
//! reads: load the table fresh and derive the answer; nothing is cached.
//! Store calls block on file I/O and the write lock, so they run in spawn_blocking.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use thiserror::Error;
use tracing::{error, info};

use crate::analysis::pipeline::SentimentPipeline;
use crate::feedback::stats::{aggregate, Stats};
use crate::models::comment::CommentRecord;
use crate::store::seed::SEED_COMMENTS;
use crate::store::{write_rows, DatasetStore, StoreError};

/// Longest accepted comment, in characters.
pub const MAX_COMMENT_CHARS: usize = 1000;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Comment text is empty")]
    Empty,

    #[error("Comment is longer than {max} characters")]
    TooLong { max: usize },

    #[error("Comment could not be stored: {0}")]
    Internal(String),
}

/// Source of record timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

pub struct FeedbackService {
    store: Arc<DatasetStore>,
    pipeline: SentimentPipeline,
    clock: Arc<dyn Clock>,
}

impl FeedbackService {
    pub fn new(store: DatasetStore, pipeline: SentimentPipeline, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(store),
            pipeline,
            clock,
        }
    }

    async fn with_store<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&DatasetStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref())).await?
    }

    /// Analyzes and stores one comment. Nothing is written unless the whole
    /// pipeline succeeded.
    pub async fn submit_comment(
        &self,
        text: &str,
        name: &str,
        email: &str,
    ) -> Result<CommentRecord, SubmitError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SubmitError::Empty);
        }
        if text.chars().count() > MAX_COMMENT_CHARS {
            return Err(SubmitError::TooLong {
                max: MAX_COMMENT_CHARS,
            });
        }

        let analysis = self.pipeline.analyze(text).await;
        let created_at = self.clock.now();
        let name = name.to_string();
        let email = email.to_string();

        self.with_store(move |store| {
            store.append_with(|id| {
                CommentRecord::from_analysis(id, created_at, &name, &email, analysis)
            })
        })
        .await
        .map_err(|e| {
            error!("Failed to append comment: {e}");
            SubmitError::Internal(e.to_string())
        })
    }

    pub async fn get_stats(&self) -> Result<Stats, StoreError> {
        self.with_store(|store| Ok(aggregate(&store.load()))).await
    }

    /// The `n` newest comments, newest first. Same-second ties go to the higher id.
    pub async fn list_recent(&self, n: usize) -> Result<Vec<CommentRecord>, StoreError> {
        let mut rows = self.export_rows().await?;
        rows.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.id.cmp(&a.id))
        });
        rows.truncate(n);
        Ok(rows)
    }

    /// Deleting an unknown id is a successful no-op.
    pub async fn delete_comment(&self, id: u64) -> Result<bool, StoreError> {
        self.with_store(move |store| store.delete(id)).await
    }

    /// Every stored row, in file order.
    pub async fn export_rows(&self) -> Result<Vec<CommentRecord>, StoreError> {
        self.with_store(|store| Ok(store.load().into_rows())).await
    }

    /// The current table rendered as CSV with the fixed header.
    pub async fn export_csv(&self) -> Result<Vec<u8>, StoreError> {
        self.with_store(|store| {
            let mut buf = Vec::new();
            write_rows(&mut buf, &store.load().into_rows())?;
            Ok(buf)
        })
        .await
    }

    /// Seeds an absent or empty dataset with the example comments, each run
    /// through the full pipeline. Returns how many rows were written.
    pub async fn initialize_if_empty(&self) -> Result<usize, StoreError> {
        if !self.with_store(|store| Ok(store.needs_seed())).await? {
            return Ok(0);
        }
        info!("Initializing dataset with example comments...");

        let created_at = self.clock.now();
        let mut records = Vec::with_capacity(SEED_COMMENTS.len());
        for (idx, seed) in SEED_COMMENTS.iter().enumerate() {
            let analysis = self.pipeline.analyze(seed.text).await;
            records.push(CommentRecord::from_analysis(
                idx as u64 + 1,
                created_at,
                seed.author,
                &seed.email(),
                analysis,
            ));
        }
        self.with_store(move |store| store.initialize_if_empty(records))
            .await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicI64, Ordering};

    use chrono::{Duration, NaiveDate, NaiveDateTime};

    use super::Clock;

    /// Starts at a fixed instant and advances one second per call.
    pub struct SteppingClock {
        start: NaiveDateTime,
        ticks: AtomicI64,
    }

    impl SteppingClock {
        pub fn new() -> Self {
            Self {
                start: NaiveDate::from_ymd_opt(2024, 6, 1)
                    .and_then(|d| d.and_hms_opt(9, 0, 0))
                    .unwrap(),
                ticks: AtomicI64::new(0),
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> NaiveDateTime {
            let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
            self.start + Duration::seconds(tick)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::SteppingClock;
    use super::*;
    use crate::analysis::classifier::SentimentLabel;
    use crate::analysis::normalizer::test_support::FixedTranslator;
    use crate::analysis::pipeline::test_support::{offline_pipeline, pipeline_with};
    use crate::feedback::stats::StatsStatus;
    use crate::models::comment::{ANONYMOUS, COLUMNS};
    use tempfile::{tempdir, TempDir};

    struct FrozenClock;

    impl Clock for FrozenClock {
        fn now(&self) -> NaiveDateTime {
            chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
                .and_then(|d| d.and_hms_opt(12, 0, 0))
                .unwrap()
        }
    }

    fn service(dir: &TempDir) -> FeedbackService {
        FeedbackService::new(
            DatasetStore::new(dir.path().join("comments.csv")),
            offline_pipeline(),
            Arc::new(SteppingClock::new()),
        )
    }

    #[tokio::test]
    async fn test_submit_stores_scored_record() {
        let dir = tempdir().unwrap();
        let svc = service(&dir);
        let r = svc
            .submit_comment("  I love this, excellent service!  ", "Ana", "ana@ejemplo.com")
            .await
            .unwrap();
        assert_eq!(r.id, 1);
        assert_eq!(r.comment_original, "I love this, excellent service!");
        assert_eq!(r.sentiment_label, SentimentLabel::Positive);
        assert_eq!(r.timestamp, "2024-06-01 09:00:00");
        assert_eq!(svc.export_rows().await.unwrap(), vec![r]);
    }

    #[tokio::test]
    async fn test_submit_rejects_empty() {
        let dir = tempdir().unwrap();
        let svc = service(&dir);
        assert!(matches!(
            svc.submit_comment("   ", "Ana", "").await,
            Err(SubmitError::Empty)
        ));
        assert!(svc.export_rows().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_rejects_too_long() {
        let dir = tempdir().unwrap();
        let svc = service(&dir);
        let long = "á".repeat(MAX_COMMENT_CHARS + 1);
        assert!(matches!(
            svc.submit_comment(&long, "Ana", "").await,
            Err(SubmitError::TooLong { max: MAX_COMMENT_CHARS })
        ));
        // exactly the limit is fine, counted in characters not bytes
        let at_limit = "á".repeat(MAX_COMMENT_CHARS);
        assert!(svc.submit_comment(&at_limit, "Ana", "").await.is_ok());
    }

    #[tokio::test]
    async fn test_blank_name_becomes_anonymous() {
        let dir = tempdir().unwrap();
        let svc = service(&dir);
        let r = svc.submit_comment("The bus arrived", "", "").await.unwrap();
        assert_eq!(r.author_name, ANONYMOUS);
        assert_eq!(r.author_email, "");
    }

    #[tokio::test]
    async fn test_stats_after_three_known_comments() {
        let dir = tempdir().unwrap();
        let svc = service(&dir);
        for text in [
            "I love this, excellent service!",
            "This is terrible and late",
            "The bus arrived",
        ] {
            svc.submit_comment(text, "", "").await.unwrap();
        }
        let stats = svc.get_stats().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.positives, 1);
        assert_eq!(stats.negatives, 1);
        assert_eq!(stats.neutrals, 1);
        assert_eq!(stats.status, StatsStatus::Ok);
    }

    #[tokio::test]
    async fn test_stats_reflect_every_write() {
        let dir = tempdir().unwrap();
        let svc = service(&dir);
        assert_eq!(svc.get_stats().await.unwrap().total, 0);
        let r = svc.submit_comment("Great metro", "", "").await.unwrap();
        assert_eq!(svc.get_stats().await.unwrap().positives, 1);
        svc.delete_comment(r.id).await.unwrap();
        assert_eq!(svc.get_stats().await.unwrap().total, 0);
        assert_eq!(svc.get_stats().await.unwrap().mean_compound, 0.0);
    }

    #[tokio::test]
    async fn test_store_failure_is_internal_and_writes_nothing() {
        let dir = tempdir().unwrap();
        // the parent of the dataset path is a regular file
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "keep").unwrap();
        let svc = FeedbackService::new(
            DatasetStore::new(blocker.join("comments.csv")),
            offline_pipeline(),
            Arc::new(SteppingClock::new()),
        );
        let err = svc.submit_comment("Great metro", "", "").await.unwrap_err();
        assert!(matches!(err, SubmitError::Internal(_)));
        assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "keep");
    }

    #[tokio::test]
    async fn test_list_recent_newest_first() {
        let dir = tempdir().unwrap();
        let svc = service(&dir);
        for text in ["first", "second", "third"] {
            svc.submit_comment(text, "", "").await.unwrap();
        }
        let recent = svc.list_recent(2).await.unwrap();
        let texts: Vec<&str> = recent.iter().map(|r| r.comment_original.as_str()).collect();
        assert_eq!(texts, vec!["third", "second"]);
        assert_eq!(svc.list_recent(10).await.unwrap().len(), 3);
        assert!(svc.list_recent(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_recent_breaks_ties_by_id() {
        let dir = tempdir().unwrap();
        let svc = FeedbackService::new(
            DatasetStore::new(dir.path().join("comments.csv")),
            offline_pipeline(),
            Arc::new(FrozenClock),
        );
        for text in ["a", "b", "c"] {
            svc.submit_comment(text, "", "").await.unwrap();
        }
        let ids: Vec<u64> = svc.list_recent(3).await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_ok() {
        let dir = tempdir().unwrap();
        let svc = service(&dir);
        svc.submit_comment("Great metro", "", "").await.unwrap();
        assert!(!svc.delete_comment(99).await.unwrap());
        assert_eq!(svc.export_rows().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_export_csv_has_header_even_when_empty() {
        let dir = tempdir().unwrap();
        let svc = service(&dir);
        let csv = String::from_utf8(svc.export_csv().await.unwrap()).unwrap();
        assert_eq!(csv.trim_end(), COLUMNS.join(","));
    }

    #[tokio::test]
    async fn test_export_csv_contains_rows() {
        let dir = tempdir().unwrap();
        let svc = service(&dir);
        svc.submit_comment("Great metro", "Laura", "laura@ejemplo.com")
            .await
            .unwrap();
        let csv = String::from_utf8(svc.export_csv().await.unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("1,2024-06-01 09:00:00,Laura,laura@ejemplo.com,Great metro,"));
        assert!(lines[1].ends_with(",Positive"));
    }

    #[tokio::test]
    async fn test_initialize_if_empty_seeds_once() {
        let dir = tempdir().unwrap();
        let svc = service(&dir);
        let written = svc.initialize_if_empty().await.unwrap();
        assert_eq!(written, SEED_COMMENTS.len());
        assert_eq!(svc.initialize_if_empty().await.unwrap(), 0);

        let rows = svc.export_rows().await.unwrap();
        let ids: Vec<u64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=SEED_COMMENTS.len() as u64).collect::<Vec<_>>());
        assert!(rows.iter().all(|r| r.label_is_consistent()));
        assert_eq!(rows[0].author_email, "carlos@ejemplo.com");
    }

    #[tokio::test]
    async fn test_seeded_dataset_continues_ids() {
        let dir = tempdir().unwrap();
        let svc = service(&dir);
        svc.initialize_if_empty().await.unwrap();
        let r = svc.submit_comment("Great metro", "", "").await.unwrap();
        assert_eq!(r.id, SEED_COMMENTS.len() as u64 + 1);
    }

    #[tokio::test]
    async fn test_seeding_skips_non_empty_dataset() {
        let dir = tempdir().unwrap();
        let svc = service(&dir);
        svc.submit_comment("Great metro", "", "").await.unwrap();
        assert_eq!(svc.initialize_if_empty().await.unwrap(), 0);
        assert_eq!(svc.export_rows().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_spanish_submission_uses_translation() {
        let dir = tempdir().unwrap();
        let svc = FeedbackService::new(
            DatasetStore::new(dir.path().join("comments.csv")),
            pipeline_with(Arc::new(FixedTranslator::new(
                "Drivers are very friendly and professional",
            ))),
            Arc::new(SteppingClock::new()),
        );
        let r = svc
            .submit_comment("Los conductores son muy amables y profesionales", "Javier", "")
            .await
            .unwrap();
        assert_eq!(r.comment_original, "Los conductores son muy amables y profesionales");
        assert_eq!(r.comment_translated, "Drivers are very friendly and professional");
        assert_eq!(r.sentiment_label, SentimentLabel::Positive);
    }

    #[tokio::test]
    async fn test_concurrent_submissions_get_unique_ids() {
        let dir = tempdir().unwrap();
        let svc = Arc::new(service(&dir));
        let tasks: Vec<_> = (0..10)
            .map(|i| {
                let svc = Arc::clone(&svc);
                tokio::spawn(async move {
                    svc.submit_comment(&format!("comment number {i}"), "", "")
                        .await
                        .unwrap()
                        .id
                })
            })
            .collect();
        let mut ids = Vec::new();
        for t in tasks {
            ids.push(t.await.unwrap());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=10).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_submission_waiting_on_lock_does_not_stall_runtime() {
        let dir = tempdir().unwrap();
        let svc = Arc::new(service(&dir));

        // another writer holds the lock for a while
        let (locked_tx, locked_rx) = std::sync::mpsc::channel();
        let store = Arc::clone(&svc.store);
        let holder = std::thread::spawn(move || {
            let _guard = store.lock_writes();
            locked_tx.send(()).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(400));
        });
        locked_rx.recv().unwrap();

        let submit = tokio::spawn({
            let svc = Arc::clone(&svc);
            async move { svc.submit_comment("Great metro", "", "").await }
        });

        let started = std::time::Instant::now();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(started.elapsed() < std::time::Duration::from_millis(200));

        let record = submit.await.unwrap().unwrap();
        assert_eq!(record.id, 1);
        holder.join().unwrap();
    }
}
