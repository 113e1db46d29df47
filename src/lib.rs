#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Bandit-style Bayesian hyperparameter tuning over discrete candidate values.
//!
//! Each hyperparameter gets a [`ParamSampler`](sampler::ParamSampler) that
//! keeps a prior score per candidate value and every score observed so far.
//! Sampling blends the prior with the observed advantage of each value over
//! the global mean, weighting the prior like `N` pseudo-observations, and
//! draws from the softmax of the result. A [`Tuner`] ties the samplers to an
//! external [`Evaluator`] that trains and scores a configuration over a sweep
//! of regularization strengths (lambdas).
//!
//! # Getting Started
//!
//! ```
//! use bayes_tuner::prelude::*;
//!
//! let mut tuner = Tuner::builder()
//!     .param("lr", [1e-2, 1e-3, 1e-4], [0.0, 0.0, 0.0])
//!     .param("n_heads", [1i64, 2, 4], [0.0, 0.1, 0.0])
//!     .lambdas([5e-3, 1e-3])
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! let records = tuner
//!     .optimize(20, |config: &Configuration, lambdas: &[f64]| {
//!         let lr = config.get("lr").and_then(ParamValue::as_f64).unwrap();
//!         // Scores are [lambda][epoch].
//!         let val: Vec<Vec<f64>> = lambdas
//!             .iter()
//!             .map(|l| vec![-(lr.log10() + 3.0).abs() - l; 4])
//!             .collect();
//!         Ok::<_, Error>(Evaluation::new(val.clone(), val))
//!     })
//!     .unwrap();
//!
//! assert_eq!(records.len(), 20);
//! println!("{}", records.last().unwrap());
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Tuner`] | Run tuning steps: sample, evaluate, feed back. |
//! | [`ParamSampler`](sampler::ParamSampler) | Per-hyperparameter statistics and weighted choice. |
//! | [`Evaluator`] | The external process that scores a configuration. |
//! | [`StepRecord`] | What one step returns; its `Display` is the step summary. |
//! | [`HistoryStorage`](storage::HistoryStorage) | Where the step log lives. |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing), gated by [`Verbosity`] | on |
//! | `serde` | `Serialize`/`Deserialize` on public types, [`Tuner::save_history`], `HistorySnapshot` | off |
//! | `journal` | [`JournalStorage`](storage::JournalStorage): JSONL history with file locking (enables `serde`) | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

mod error;
mod evaluator;
mod param;
mod record;
mod rng_util;
pub mod sampler;
mod stats;
pub mod storage;
mod tuner;
mod types;

pub use error::{BoxError, Error, Result};
pub use evaluator::{Configuration, Evaluation, Evaluator};
pub use param::ParamValue;
pub use record::{HistoryEntry, StepRecord};
#[cfg(feature = "serde")]
pub use tuner::HistorySnapshot;
pub use tuner::{DEFAULT_LAMBDAS, DEFAULT_PRIOR_WEIGHT, Tuner, TunerBuilder};
pub use types::Verbosity;

/// Convenient wildcard import for the most common types.
///
/// ```
/// use bayes_tuner::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::evaluator::{Configuration, Evaluation, Evaluator};
    pub use crate::param::ParamValue;
    pub use crate::record::{HistoryEntry, StepRecord};
    pub use crate::sampler::ParamSampler;
    #[cfg(feature = "journal")]
    pub use crate::storage::JournalStorage;
    pub use crate::storage::{HistoryStorage, MemoryStorage};
    #[cfg(feature = "serde")]
    pub use crate::tuner::HistorySnapshot;
    pub use crate::tuner::{DEFAULT_LAMBDAS, DEFAULT_PRIOR_WEIGHT, Tuner, TunerBuilder};
    pub use crate::types::Verbosity;
}
