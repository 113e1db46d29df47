use super::{HistoryStorage, step_after};
use crate::record::HistoryEntry;

/// In-memory history storage (the default).
///
/// Entries live as long as the tuner. Save them with
/// [`Tuner::save_history`](crate::Tuner::save_history) or use a journal to
/// keep them across runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Vec<HistoryEntry>,
    next_step: u64,
}

impl MemoryStorage {
    /// Creates a new, empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory store pre-populated with `entries`.
    ///
    /// A tuner built on it replays the entries into its samplers and numbers
    /// its own steps after the highest stored one.
    #[must_use]
    pub fn with_entries(entries: Vec<HistoryEntry>) -> Self {
        let next_step = step_after(&entries);
        Self { entries, next_step }
    }

    /// Consumes the store and returns its entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<HistoryEntry> {
        self.entries
    }
}

impl HistoryStorage for MemoryStorage {
    fn push(&mut self, entry: HistoryEntry) -> crate::Result<()> {
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
