#[cfg(feature = "serde")]
use std::collections::HashMap;

#[cfg(feature = "serde")]
use crate::record::HistoryEntry;
#[cfg(feature = "serde")]
use crate::storage::MemoryStorage;

#[cfg(feature = "serde")]
use super::Tuner;

/// A serializable snapshot of a tuner's history.
///
/// Samplers are not serialized: their statistics are a pure function of the
/// history and are rebuilt by replaying it. Load a snapshot, turn it into a
/// storage with [`into_storage`](Self::into_storage) and hand that to
/// [`TunerBuilder::storage`](crate::TunerBuilder::storage) with the same
/// hyperparameter definitions.
///
/// # Schema versioning
///
/// The `version` field enables future schema evolution without breaking existing files.
/// The current version is `1`.
#[cfg(feature = "serde")]
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HistorySnapshot {
    /// Schema version for forward compatibility.
    pub version: u32,
    /// The lambda sweep of the tuner that produced the history.
    pub lambdas: Vec<f64>,
    /// Every history entry, in step order.
    pub entries: Vec<HistoryEntry>,
    /// Optional free-form metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[cfg(feature = "serde")]
impl HistorySnapshot {
    /// Load a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let file = std::fs::File::open(path)?;
        serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Turn the snapshot into an in-memory storage that a new tuner replays.
    #[must_use]
    pub fn into_storage(self) -> MemoryStorage {
        MemoryStorage::with_entries(self.entries)
    }
}

#[cfg(feature = "serde")]
impl Tuner {
    /// Capture the current history as a [`HistorySnapshot`].
    #[must_use]
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            version: 1,
            lambdas: self.lambdas.clone(),
            entries: self.history(),
            metadata: HashMap::new(),
        }
    }

    /// Save the history to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created or written.
    pub fn save_history(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        let snapshot = self.snapshot();

        // Write to a temp file in the same directory, then rename.
        let parent = path.parent().unwrap_or(std::path::Path::new("."));
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            path.file_name().unwrap_or_default().to_string_lossy()
        ));
        let file = std::fs::File::create(&tmp_path)?;
        serde_json::to_writer_pretty(file, &snapshot).map_err(std::io::Error::other)?;
        std::fs::rename(&tmp_path, path)
    }
}
