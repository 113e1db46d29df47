//! Tuner implementation driving sampling, evaluation and feedback.

use crate::error::{Error, Result};
use crate::param::ParamValue;
use crate::record::HistoryEntry;
use crate::sampler::ParamSampler;
use crate::storage::HistoryStorage;
use crate::types::Verbosity;

mod builder;
mod persistence;
mod step;

pub use builder::TunerBuilder;
#[cfg(feature = "serde")]
pub use persistence::HistorySnapshot;

/// Regularization strengths swept by default.
pub const DEFAULT_LAMBDAS: [f64; 3] = [5e-3, 1e-3, 5e-4];

/// Default pseudo-count given to every sampler's priors.
pub const DEFAULT_PRIOR_WEIGHT: f64 = 2.0;

/// A tuner owns one [`ParamSampler`] per hyperparameter and runs tuning steps.
///
/// Each [`step`](Self::step) samples a configuration, has an
/// [`Evaluator`](crate::Evaluator) score it over the lambda sweep, logs the
/// result to the history storage and feeds the averaged validation score back
/// into every sampler.
///
/// Every hyperparameter receives the same feedback; credit for a good score
/// is spread over all values that were sampled together and separated only
/// statistically, through the advantage estimates, as evidence accumulates.
///
/// `step` takes `&mut self`, so a tuner cannot be stepped concurrently.
/// Independent tuners can run on separate threads.
///
/// # Examples
///
/// ```
/// use bayes_tuner::prelude::*;
///
/// let tuner = Tuner::builder()
///     .param("lr", [1e-3, 1e-4, 1e-5], [0.0, 0.2, 0.0])
///     .param("n_heads", [1i64, 2, 4], [0.0, 0.0, 0.0])
///     .build()
///     .unwrap();
///
/// assert_eq!(tuner.lambdas(), &DEFAULT_LAMBDAS);
/// assert_eq!(tuner.param_names().collect::<Vec<_>>(), ["lr", "n_heads"]);
/// ```
pub struct Tuner {
    /// Samplers in registration order.
    pub(crate) samplers: Vec<(String, ParamSampler)>,
    pub(crate) lambdas: Vec<f64>,
    pub(crate) rng: fastrand::Rng,
    pub(crate) verbosity: Verbosity,
    pub(crate) storage: Box<dyn HistoryStorage>,
}

impl Tuner {
    /// Return a [`TunerBuilder`] for constructing a tuner with a fluent API.
    #[must_use]
    pub fn builder() -> TunerBuilder {
        TunerBuilder::new()
    }

    /// Create a tuner from `(name, (values, priors))` pairs with the default
    /// prior weight and lambdas.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any sampler is invalid or a name repeats.
    ///
    /// # Examples
    ///
    /// ```
    /// use bayes_tuner::{ParamValue, Tuner};
    ///
    /// let tuner = Tuner::new([(
    ///     "lr",
    ///     (vec![ParamValue::Float(0.1), ParamValue::Float(0.01)], vec![0.0, 0.0]),
    /// )])
    /// .unwrap();
    /// assert!(tuner.sampler("lr").is_some());
    /// ```
    pub fn new<N, I>(params: I) -> Result<Self>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, (Vec<ParamValue>, Vec<f64>))>,
    {
        params
            .into_iter()
            .fold(Self::builder(), |b, (name, (values, priors))| {
                b.param(name, values, priors)
            })
            .build()
    }

    /// The lambda sweep passed to the evaluator on every step.
    #[must_use]
    pub fn lambdas(&self) -> &[f64] {
        &self.lambdas
    }

    /// The configured verbosity.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Change the verbosity of subsequent steps.
    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    /// Hyperparameter names in registration order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.samplers.iter().map(|(name, _)| name.as_str())
    }

    /// The sampler of hyperparameter `name`.
    #[must_use]
    pub fn sampler(&self, name: &str) -> Option<&ParamSampler> {
        self.samplers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    /// Iterates over `(name, sampler)` pairs in registration order.
    pub fn samplers(&self) -> impl Iterator<Item = (&str, &ParamSampler)> {
        self.samplers.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Number of entries in the history.
    #[must_use]
    pub fn n_steps(&self) -> usize {
        self.storage.len()
    }

    /// A copy of the full history.
    #[must_use]
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.storage.entries().to_vec()
    }

    /// The history entry with the highest mean validation score.
    #[must_use]
    pub fn best_entry(&self) -> Option<&HistoryEntry> {
        self.storage
            .entries()
            .iter()
            .filter_map(|e| e.score().ok().map(|s| (s, e)))
            .max_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, e)| e)
    }

    /// Feed stored history entries back into the samplers.
    ///
    /// Each entry is checked in full before any sampler is touched, so a bad
    /// entry leaves the samplers as they were after the previous one. An
    /// entry must assign every hyperparameter and use the tuner's lambdas,
    /// otherwise the samplers would disagree on how many scores they hold.
    pub(crate) fn replay(&mut self, entries: &[HistoryEntry]) -> Result<()> {
        for entry in entries {
            if entry.lambdas != self.lambdas {
                return Err(Error::LambdaMismatch {
                    step: entry.step,
                    expected: self.lambdas.clone(),
                    found: entry.lambdas.clone(),
                });
            }
            if let Some((name, _)) = entry.config.iter().find(|(n, _)| self.sampler(n).is_none()) {
                return Err(Error::UnknownParameter(name.to_owned()));
            }
            let score = entry.score()?;
            let lambda_scores = entry.lambda_scores()?;

            let mut picks = Vec::with_capacity(self.samplers.len());
            for (name, sampler) in &self.samplers {
                let value = entry.config.get(name).ok_or_else(|| Error::MissingParameter {
                    step: entry.step,
                    name: name.clone(),
                })?;
                let idx = sampler.index_of(value).ok_or_else(|| Error::UnknownValue {
                    name: name.clone(),
                    value: value.to_string(),
                })?;
                picks.push(idx);
            }

            for ((_, sampler), idx) in self.samplers.iter_mut().zip(picks) {
                sampler.select(idx);
                sampler.update_stat(score, &lambda_scores)?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Tuner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tuner")
            .field("samplers", &self.samplers)
            .field("lambdas", &self.lambdas)
            .field("verbosity", &self.verbosity)
            .field("n_steps", &self.n_steps())
            .finish_non_exhaustive()
    }
}
