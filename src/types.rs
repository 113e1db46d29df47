//! Core types for the tuner.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How much the tuner reports through `tracing` while it runs.
///
/// Events are only emitted when the `tracing` feature is enabled; the level
/// picked here decides which of them the tuner produces in the first place.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Verbosity {
    /// No events.
    Quiet,
    /// One event per completed step with the aggregate score and elapsed time.
    #[default]
    Summary,
    /// Also report the sampled configuration and every sampler's probabilities.
    Detailed,
}
