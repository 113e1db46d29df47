//! Per-hyperparameter sampling over a discrete candidate set.
//!
//! A [`ParamSampler`] owns the candidate values of one hyperparameter, a prior
//! score for each of them, and every score observed so far. Sampling turns
//! those statistics into a probability vector and draws one candidate:
//!
//! ```text
//! expected_global = mean(global_scores)            (0 before the first score)
//! advantage[j]    = mean(scores[j]) - expected_global   if freq[j] > 0, else 0
//! biased[j]       = (N * prior[j] + freq[j] * advantage[j]) / (N + freq[j])
//! p               = softmax(biased)
//! ```
//!
//! `N` (the prior weight) acts as a pseudo-count: an unvisited value is
//! sampled according to its prior alone, and as evidence accumulates the
//! empirical advantage takes over.
//!
//! ```
//! use bayes_tuner::sampler::ParamSampler;
//!
//! let mut sampler = ParamSampler::new(
//!     vec![0.1.into(), 0.01.into(), 0.001.into()],
//!     vec![0.0, 0.5, 0.0],
//!     2.0,
//! )
//! .unwrap();
//!
//! let mut rng = fastrand::Rng::with_seed(42);
//! let lr = sampler.sample(&mut rng).unwrap().clone();
//! sampler.update_stat(0.8, &[0.7, 0.9]).unwrap();
//! assert_eq!(sampler.stats()[sampler.last_selected().unwrap()].freq, 1);
//! # let _ = lr;
//! ```

mod bayes;

pub use bayes::ParamSampler;

use crate::param::ParamValue;

/// Observations recorded for one candidate value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueStats {
    /// Aggregate objective score of every evaluation that used this value.
    pub scores: Vec<f64>,
    /// Per-lambda score vectors, aligned with `scores`.
    pub lambda_scores: Vec<Vec<f64>>,
    /// Number of recorded evaluations.
    pub freq: usize,
}

impl ValueStats {
    /// Mean of the recorded aggregate scores, `None` if the value was never evaluated.
    #[must_use]
    pub fn mean_score(&self) -> Option<f64> {
        crate::stats::mean(&self.scores)
    }
}

/// A read-only view of one candidate value and its current standing.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueSummary {
    /// The candidate value.
    pub value: ParamValue,
    /// The prior score supplied at construction.
    pub prior: f64,
    /// Number of recorded evaluations.
    pub freq: usize,
    /// Mean aggregate score, `None` if never evaluated.
    pub mean_score: Option<f64>,
    /// Prior-weighted advantage used for sampling.
    pub biased_advantage: f64,
    /// Current sampling probability.
    pub probability: f64,
}
