//! Dataset store: the flat CSV file that is the single source of truth for comments.
//!
//! Every read re-loads the file; every mutation is load → modify → rewrite the
//! whole file while holding the store's write lock. Rewrites go to a temp file
//! in the same directory and are renamed over the dataset, so readers (which do
//! not take the lock) see either the old table or the new one, never a torn file.
//!
//! Single-process only: the lock does not protect against a second process
//! writing the same file.

pub mod seed;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::comment::{CommentRecord, COLUMNS};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Dataset I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Dataset CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to replace dataset file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Comment id {0} already exists")]
    DuplicateId(u64),

    #[error("Dataset task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

// ────────────────────────────────────────────────────────────────────────────
// Table
// ────────────────────────────────────────────────────────────────────────────

/// In-memory snapshot of the dataset. Always carries the full fixed schema,
/// even with zero rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    rows: Vec<CommentRecord>,
}

impl Table {
    pub fn new(rows: Vec<CommentRecord>) -> Self {
        Self { rows }
    }

    #[cfg(test)]
    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    pub fn rows(&self) -> &[CommentRecord] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<CommentRecord> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn max_id(&self) -> Option<u64> {
        self.rows.iter().map(|r| r.id).max()
    }

    /// Max existing id + 1, or 1 for an empty table.
    pub fn next_id(&self) -> u64 {
        self.max_id().map_or(1, |max| max + 1)
    }

    pub fn contains_id(&self, id: u64) -> bool {
        self.rows.iter().any(|r| r.id == id)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

enum Loaded {
    Missing,
    Table(Table),
    Corrupt(StoreError),
}

pub struct DatasetStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the full table. A missing or empty file is an empty table; an
    /// unreadable file is logged and also treated as empty.
    pub fn load(&self) -> Table {
        match self.read() {
            Loaded::Missing => Table::default(),
            Loaded::Table(table) => table,
            Loaded::Corrupt(e) => {
                error!("Failed to load dataset {}: {e}", self.path.display());
                Table::default()
            }
        }
    }

    /// Appends the record built by `build`, which receives the next free id.
    /// The lock is held from load to rewrite, so ids never collide within the process.
    pub fn append_with<F>(&self, build: F) -> Result<CommentRecord, StoreError>
    where
        F: FnOnce(u64) -> CommentRecord,
    {
        let _guard = self.write_lock.lock();
        let table = self.load_for_write()?;
        let record = build(table.next_id());
        if table.contains_id(record.id) {
            return Err(StoreError::DuplicateId(record.id));
        }
        let mut rows = table.into_rows();
        rows.push(record.clone());
        self.write(&rows)?;
        info!("Comment #{} appended: {}", record.id, record.sentiment_label);
        Ok(record)
    }

    /// Appends `record`, assigning the next id when `record.id` is 0.
    #[cfg(test)]
    pub fn append(&self, record: CommentRecord) -> Result<CommentRecord, StoreError> {
        self.append_with(|next_id| CommentRecord {
            id: if record.id == 0 { next_id } else { record.id },
            ..record
        })
    }

    /// Removes the row with `id`. Returns whether a row was removed; an
    /// unknown id leaves the file untouched, and so does an unreadable file.
    pub fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock();
        let mut rows = match self.read() {
            Loaded::Missing => return Ok(false),
            Loaded::Table(table) => table.into_rows(),
            Loaded::Corrupt(e) => {
                error!(
                    "Delete of comment #{id} skipped: dataset {} unreadable ({e})",
                    self.path.display()
                );
                return Ok(false);
            }
        };
        let before = rows.len();
        rows.retain(|r| r.id != id);
        if rows.len() == before {
            info!("Delete of comment #{id} ignored: no such id");
            return Ok(false);
        }
        self.write(&rows)?;
        info!("Comment #{id} deleted");
        Ok(true)
    }

    /// Whether the backing file is absent or empty.
    pub fn needs_seed(&self) -> bool {
        match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        }
    }

    /// Writes `records` only if the backing file is still absent or empty.
    /// Returns how many rows were written.
    pub fn initialize_if_empty(&self, records: Vec<CommentRecord>) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock();
        if !self.needs_seed() {
            return Ok(0);
        }
        self.write(&records)?;
        info!(
            "Dataset {} initialized with {} example comments",
            self.path.display(),
            records.len()
        );
        Ok(records.len())
    }

    /// Holds the write lock for as long as the guard lives.
    #[cfg(test)]
    pub(crate) fn lock_writes(&self) -> parking_lot::MutexGuard<'_, ()> {
        self.write_lock.lock()
    }

    fn read(&self) -> Loaded {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.len() == 0 => return Loaded::Missing,
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Loaded::Missing,
            Err(e) => return Loaded::Corrupt(e.into()),
        }
        match self.parse() {
            Ok(table) => Loaded::Table(table),
            Err(e) => Loaded::Corrupt(e),
        }
    }

    fn parse(&self) -> Result<Table, StoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;
        let rows = reader
            .deserialize::<CommentRecord>()
            .collect::<Result<Vec<_>, _>>()?;

        let inconsistent = rows.iter().filter(|r| !r.label_is_consistent()).count();
        if inconsistent > 0 {
            warn!("{inconsistent} stored comment(s) carry a label that disagrees with their compound score");
        }
        Ok(Table::new(rows))
    }

    /// Like `load`, but moves an unreadable file aside before treating it as
    /// empty, so the rewrite that follows cannot destroy it.
    fn load_for_write(&self) -> Result<Table, StoreError> {
        match self.read() {
            Loaded::Missing => Ok(Table::default()),
            Loaded::Table(table) => Ok(table),
            Loaded::Corrupt(e) => {
                let backup = self.quarantine_path();
                error!(
                    "Dataset {} unreadable ({e}); moving it to {} and starting empty",
                    self.path.display(),
                    backup.display()
                );
                fs::rename(&self.path, &backup)?;
                Ok(Table::default())
            }
        }
    }

    fn quarantine_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".corrupt-{}", Local::now().format("%Y%m%d%H%M%S")));
        PathBuf::from(name)
    }

    fn write(&self, rows: &[CommentRecord]) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        write_rows(&mut tmp, rows)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;
        Ok(())
    }
}

/// Writes the fixed header followed by `rows` as CSV. The header is written
/// even when `rows` is empty.
pub fn write_rows<W: Write>(out: W, rows: &[CommentRecord]) -> Result<(), StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
