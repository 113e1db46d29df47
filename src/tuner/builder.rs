use crate::error::{Error, Result};
use crate::param::ParamValue;
use crate::sampler::ParamSampler;
use crate::storage::{HistoryStorage, MemoryStorage};
use crate::types::Verbosity;

use super::{DEFAULT_LAMBDAS, DEFAULT_PRIOR_WEIGHT, Tuner};

struct ParamSpec {
    name: String,
    values: Vec<ParamValue>,
    priors: Vec<f64>,
    prior_weight: Option<f64>,
}

/// A builder for constructing [`Tuner`] instances with a fluent API.
///
/// Created via [`Tuner::builder()`]. Validation is deferred to
/// [`build`](Self::build).
///
/// # Defaults
///
/// - Prior weight: [`DEFAULT_PRIOR_WEIGHT`]
/// - Lambdas: [`DEFAULT_LAMBDAS`]
/// - Random source: seeded from the OS
/// - Verbosity: [`Verbosity::Summary`]
/// - Storage: [`MemoryStorage`]
///
/// # Examples
///
/// ```
/// use bayes_tuner::prelude::*;
///
/// let tuner = Tuner::builder()
///     .param("lr", [1e-3, 1e-4], [0.5, 0.0])
///     .param_uniform("activation", ["relu", "gelu", "tanh"])
///     .prior_weight(4.0)
///     .lambdas([1e-2, 1e-3])
///     .seed(42)
///     .verbosity(Verbosity::Detailed)
///     .build()
///     .unwrap();
///
/// assert_eq!(tuner.sampler("lr").unwrap().prior_weight(), 4.0);
/// ```
pub struct TunerBuilder {
    params: Vec<ParamSpec>,
    prior_weight: f64,
    lambdas: Vec<f64>,
    seed: Option<u64>,
    verbosity: Verbosity,
    storage: Option<Box<dyn HistoryStorage>>,
}

impl TunerBuilder {
    /// Create a new builder with default settings.
    pub(super) fn new() -> Self {
        Self {
            params: Vec::new(),
            prior_weight: DEFAULT_PRIOR_WEIGHT,
            lambdas: DEFAULT_LAMBDAS.to_vec(),
            seed: None,
            verbosity: Verbosity::default(),
            storage: None,
        }
    }

    /// Register a hyperparameter with its candidate values and one prior per value.
    #[must_use]
    pub fn param<V: Into<ParamValue>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
        priors: impl IntoIterator<Item = f64>,
    ) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
            priors: priors.into_iter().collect(),
            prior_weight: None,
        });
        self
    }

    /// Register a hyperparameter whose values all start with a zero prior.
    #[must_use]
    pub fn param_uniform<V: Into<ParamValue>>(
        self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values: Vec<ParamValue> = values.into_iter().map(Into::into).collect();
        let priors = vec![0.0; values.len()];
        self.param(name, values, priors)
    }

    /// Register a hyperparameter with its own prior weight, overriding
    /// [`prior_weight`](Self::prior_weight) for this one.
    #[must_use]
    pub fn param_with_prior_weight<V: Into<ParamValue>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
        priors: impl IntoIterator<Item = f64>,
        prior_weight: f64,
    ) -> Self {
        self = self.param(name, values, priors);
        if let Some(spec) = self.params.last_mut() {
            spec.prior_weight = Some(prior_weight);
        }
        self
    }

    /// Set the pseudo-count given to priors of every hyperparameter.
    #[must_use]
    pub fn prior_weight(mut self, prior_weight: f64) -> Self {
        self.prior_weight = prior_weight;
        self
    }

    /// Set the lambda sweep passed to the evaluator.
    #[must_use]
    pub fn lambdas(mut self, lambdas: impl IntoIterator<Item = f64>) -> Self {
        self.lambdas = lambdas.into_iter().collect();
        self
    }

    /// Seed the random source for reproducible sampling.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set how much the tuner reports through `tracing`.
    #[must_use]
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set a custom history storage backend.
    ///
    /// Entries already in the storage are replayed into the samplers by
    /// [`build`](Self::build).
    #[must_use]
    pub fn storage(mut self, storage: impl HistoryStorage + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    /// Build the [`Tuner`].
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyLambdas`] if no lambda was given.
    /// - [`Error::DuplicateParameter`] if a name is registered twice.
    /// - Any error of [`ParamSampler::new`].
    /// - [`Error::UnknownParameter`], [`Error::UnknownValue`] or
    ///   [`Error::ScoreShape`] if a stored history entry cannot be replayed.
    pub fn build(self) -> Result<Tuner> {
        if self.lambdas.is_empty() {
            return Err(Error::EmptyLambdas);
        }

        let mut samplers: Vec<(String, ParamSampler)> = Vec::with_capacity(self.params.len());
        for spec in self.params {
            if samplers.iter().any(|(n, _)| *n == spec.name) {
                return Err(Error::DuplicateParameter(spec.name));
            }
            let weight = spec.prior_weight.unwrap_or(self.prior_weight);
            let sampler = ParamSampler::new(spec.values, spec.priors, weight)?;
            samplers.push((spec.name, sampler));
        }

        let rng = self
            .seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        let storage = self
            .storage
            .unwrap_or_else(|| Box::new(MemoryStorage::new()));

        let mut tuner = Tuner {
            samplers,
            lambdas: self.lambdas,
            rng,
            verbosity: self.verbosity,
            storage,
        };

        if !tuner.storage.is_empty() {
            let stored = tuner.history();
            tuner.replay(&stored)?;
            trace_info!(n_entries = stored.len(), "resumed tuner from stored history");
        }

        Ok(tuner)
    }
}
