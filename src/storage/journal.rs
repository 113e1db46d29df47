//! JSONL-based journal storage backend.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::{HistoryStorage, step_after};
use crate::record::HistoryEntry;

/// A storage backend that appends history entries as JSON lines to a file.
///
/// Entries are kept in memory and written through to the JSONL file on
/// every push. Writes take an exclusive file lock, reads a shared one, so an
/// analysis process can tail the file while tuning runs.
///
/// Unlike a cache, the journal is the record of the session: a failed write
/// is reported and the entry is not added to memory either.
///
/// # Examples
///
/// ```no_run
/// use bayes_tuner::prelude::*;
/// use bayes_tuner::storage::JournalStorage;
///
/// let storage = JournalStorage::open("tuning.jsonl").unwrap();
/// let tuner = Tuner::builder()
///     .param("lr", [1e-3, 1e-4], [0.0, 0.0])
///     .storage(storage)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct JournalStorage {
    entries: Vec<HistoryEntry>,
    next_step: u64,
    path: PathBuf,
}

impl JournalStorage {
    /// Starts a new journal at `path`.
    ///
    /// The file is created on the first write. A journal that already holds
    /// entries is refused, since appending a fresh session to it would repeat
    /// its step numbers; reopen it with [`open`](Self::open) instead.
    ///
    /// # Errors
    ///
    /// Returns a [`Storage`](crate::Error::Storage) error if `path` exists
    /// and holds entries, or cannot be read.
    pub fn new(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let existing = load_entries_from_file(&path)?;
        if !existing.is_empty() {
            return Err(crate::Error::Storage(format!(
                "{} already holds {} entries, open it to resume",
                path.display(),
                existing.len()
            )));
        }
        Ok(Self {
            entries: Vec::new(),
            next_step: 0,
            path,
        })
    }

    /// Opens a journal file and loads all stored entries.
    ///
    /// If the file does not exist, returns an empty storage (no error).
    ///
    /// # Errors
    ///
    /// Returns a [`Storage`](crate::Error::Storage) error if the file
    /// exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = load_entries_from_file(&path)?;
        let next_step = step_after(&entries);
        Ok(Self {
            entries,
            next_step,
            path,
        })
    }

    /// Path of the journal file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_to_file(&self, entry: &HistoryEntry) -> crate::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(storage_err)?;

        file.lock_exclusive().map_err(storage_err)?;

        let line = serde_json::to_string(entry).map_err(storage_err)?;
        writeln!(file, "{line}").map_err(storage_err)?;
        file.flush().map_err(storage_err)?;

        file.unlock().map_err(storage_err)?;
        Ok(())
    }
}

impl HistoryStorage for JournalStorage {
    fn push(&mut self, entry: HistoryEntry) -> crate::Result<()> {
        self.write_to_file(&entry)?;
        self.next_step = self.next_step.max(entry.step + 1);
        self.entries.push(entry);
        Ok(())
    }

    fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    fn next_step(&self) -> u64 {
        self.next_step
    }
}

#[allow(clippy::needless_pass_by_value)]
fn storage_err(e: impl ToString) -> crate::Error {
    crate::Error::Storage(e.to_string())
}

/// Read all entries from a JSONL file. Returns an empty vec if the file
/// does not exist.
fn load_entries_from_file(path: &Path) -> crate::Result<Vec<HistoryEntry>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(storage_err(e)),
    };

    file.lock_shared().map_err(storage_err)?;

    let reader = BufReader::new(&file);
    let mut entries = Vec::new();

    for line in reader.lines() {
        let line = line.map_err(storage_err)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let entry: HistoryEntry = serde_json::from_str(line).map_err(storage_err)?;
        entries.push(entry);
    }

    file.unlock().map_err(storage_err)?;

    Ok(entries)
}
