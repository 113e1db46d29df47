//! History storage backends.
//!
//! The [`HistoryStorage`] trait defines where a tuner's step log lives.
//! Every [`Tuner`](crate::Tuner) owns a `Box<dyn HistoryStorage>`; the log
//! is append-only and never consulted when picking values, only when
//! resuming a run or analysing it afterwards.
//!
//! # Available backends
//!
//! | Backend | Description | Feature flag |
//! |---------|-------------|-------------|
//! | [`MemoryStorage`] | In-memory `Vec` (the default) | — |
//! | `JournalStorage` | JSONL file with `fs2` file locking | `journal` |
//!
//! Switch to `JournalStorage` to keep the log of a long tuning session on
//! disk. A journal reopened with `JournalStorage::open` and handed to
//! [`TunerBuilder::storage`](crate::TunerBuilder::storage) is replayed into
//! the new tuner's samplers, so the session picks up where it stopped.
//!
//! ```
//! use bayes_tuner::prelude::*;
//! use bayes_tuner::storage::MemoryStorage;
//!
//! let tuner = Tuner::builder()
//!     .param("heads", [1i64, 2, 4], [0.0, 0.0, 0.0])
//!     .storage(MemoryStorage::new())
//!     .build()
//!     .unwrap();
//! assert_eq!(tuner.n_steps(), 0);
//! ```

#[cfg(feature = "journal")]
mod journal;
mod memory;

#[cfg(feature = "journal")]
pub use journal::JournalStorage;
pub use memory::MemoryStorage;

use crate::record::HistoryEntry;

/// Trait for storing and retrieving history entries.
///
/// The tuner owns its storage and is the only writer, so implementations
/// need no interior locking. They must be `Send` so a tuner can be moved to
/// the thread that drives it.
pub trait HistoryStorage: Send {
    /// Append an entry to the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry could not be persisted. The stored
    /// entries must not change in that case.
    fn push(&mut self, entry: HistoryEntry) -> crate::Result<()>;

    /// Every stored entry, in insertion order.
    fn entries(&self) -> &[HistoryEntry];

    /// The step number the next entry should carry: one past the highest
    /// stored step, `0` when empty.
    fn next_step(&self) -> u64;

    /// Number of stored entries.
    fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns `true` if nothing is stored.
    fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// One past the highest step in `entries`.
pub(crate) fn step_after(entries: &[HistoryEntry]) -> u64 {
    entries.iter().map(|e| e.step).max().map_or(0, |s| s + 1)
}
