//! Prior-weighted advantage sampler.

use super::{ValueStats, ValueSummary};
use crate::error::{Error, Result};
use crate::param::ParamValue;
use crate::{rng_util, stats};

/// Sampling statistics and selection for one hyperparameter.
///
/// See the [module documentation](crate::sampler) for the selection rule.
///
/// # Usage contract
///
/// [`update_stat`](Self::update_stat) credits the index chosen by the most
/// recent [`sample`](Self::sample). Calling it twice without sampling in
/// between credits the same index twice; one evaluation per sample is the
/// expected rhythm.
#[derive(Clone, Debug)]
pub struct ParamSampler {
    values: Vec<ParamValue>,
    priors: Vec<f64>,
    prior_weight: f64,
    stats: Vec<ValueStats>,
    global_scores: Vec<f64>,
    last_selected: Option<usize>,
}

impl ParamSampler {
    /// Creates a sampler over `values` with one prior score per value.
    ///
    /// `prior_weight` is the pseudo-count `N` given to the priors.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyValues`] if `values` is empty.
    /// - [`Error::LengthMismatch`] if `values` and `priors` differ in length.
    /// - [`Error::InvalidPrior`] if a prior is NaN or infinite.
    /// - [`Error::InvalidPriorWeight`] if `prior_weight` is not positive and finite.
    pub fn new(values: Vec<ParamValue>, priors: Vec<f64>, prior_weight: f64) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::EmptyValues);
        }
        if values.len() != priors.len() {
            return Err(Error::LengthMismatch {
                values: values.len(),
                priors: priors.len(),
            });
        }
        if let Some((index, &value)) = priors.iter().enumerate().find(|(_, p)| !p.is_finite()) {
            return Err(Error::InvalidPrior { index, value });
        }
        if !prior_weight.is_finite() || prior_weight <= 0.0 {
            return Err(Error::InvalidPriorWeight(prior_weight));
        }

        let stats = vec![ValueStats::default(); values.len()];
        Ok(Self {
            values,
            priors,
            prior_weight,
            stats,
            global_scores: Vec::new(),
            last_selected: None,
        })
    }

    /// Creates a sampler with a zero prior for every value.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn uniform(values: Vec<ParamValue>, prior_weight: f64) -> Result<Self> {
        let priors = vec![0.0; values.len()];
        Self::new(values, priors, prior_weight)
    }

    /// The candidate values, in construction order.
    #[must_use]
    pub fn values(&self) -> &[ParamValue] {
        &self.values
    }

    /// The prior scores, aligned with [`values`](Self::values).
    #[must_use]
    pub fn priors(&self) -> &[f64] {
        &self.priors
    }

    /// The pseudo-count given to the priors.
    #[must_use]
    pub fn prior_weight(&self) -> f64 {
        self.prior_weight
    }

    /// Per-value statistics, aligned with [`values`](Self::values).
    #[must_use]
    pub fn stats(&self) -> &[ValueStats] {
        &self.stats
    }

    /// Every aggregate score recorded by this sampler.
    #[must_use]
    pub fn global_scores(&self) -> &[f64] {
        &self.global_scores
    }

    /// Index chosen by the latest [`sample`](Self::sample), if any.
    #[must_use]
    pub fn last_selected(&self) -> Option<usize> {
        self.last_selected
    }

    /// Mean of all recorded scores, `0.0` before the first one.
    #[must_use]
    pub fn expected_global(&self) -> f64 {
        stats::mean(&self.global_scores).unwrap_or(0.0)
    }

    /// Prior-weighted advantage of every candidate value.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn biased_advantages(&self) -> Vec<f64> {
        let expected_global = self.expected_global();
        let n = self.prior_weight;

        self.stats
            .iter()
            .zip(&self.priors)
            .map(|(stat, &prior)| {
                let advantage = stat
                    .mean_score()
                    .map_or(0.0, |mean| mean - expected_global);
                let freq = stat.freq as f64;
                (n * prior + freq * advantage) / (n + freq)
            })
            .collect()
    }

    /// Current sampling probabilities: the softmax of [`biased_advantages`](Self::biased_advantages).
    #[must_use]
    pub fn probabilities(&self) -> Vec<f64> {
        stats::softmax(&self.biased_advantages())
    }

    /// Draws a candidate value and remembers its index for the next
    /// [`update_stat`](Self::update_stat).
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateDistribution`] if the probabilities are not
    /// finite, which happens when recorded scores are so large that their mean
    /// overflows. `last_selected` is left untouched in that case.
    pub fn sample(&mut self, rng: &mut fastrand::Rng) -> Result<&ParamValue> {
        let probs = self.probabilities();
        let idx = rng_util::categorical(rng, &probs).ok_or(Error::DegenerateDistribution(probs))?;
        self.last_selected = Some(idx);
        Ok(&self.values[idx])
    }

    /// Records the outcome of evaluating the last sampled value.
    ///
    /// `score` is the aggregate objective and `lambda_scores` its per-lambda
    /// breakdown.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if [`sample`](Self::sample) was never called.
    pub fn update_stat(&mut self, score: f64, lambda_scores: &[f64]) -> Result<()> {
        let idx = self
            .last_selected
            .ok_or(Error::InvalidState("update_stat called before sample"))?;
        self.record(idx, score, lambda_scores);
        Ok(())
    }

    /// Position of `value` among the candidates.
    #[must_use]
    pub fn index_of(&self, value: &ParamValue) -> Option<usize> {
        self.values.iter().position(|v| v == value)
    }

    /// Selects `idx` as if it had been sampled. Used when replaying history.
    pub(crate) fn select(&mut self, idx: usize) {
        debug_assert!(idx < self.values.len());
        self.last_selected = Some(idx);
    }

    fn record(&mut self, idx: usize, score: f64, lambda_scores: &[f64]) {
        let stat = &mut self.stats[idx];
        stat.scores.push(score);
        stat.lambda_scores.push(lambda_scores.to_vec());
        stat.freq += 1;
        self.global_scores.push(score);
    }

    /// A snapshot of every candidate with its statistics and current probability.
    #[must_use]
    pub fn summary(&self) -> Vec<ValueSummary> {
        let advantages = self.biased_advantages();
        let probs = stats::softmax(&advantages);

        self.values
            .iter()
            .enumerate()
            .map(|(i, value)| ValueSummary {
                value: value.clone(),
                prior: self.priors[i],
                freq: self.stats[i].freq,
                mean_score: self.stats[i].mean_score(),
                biased_advantage: advantages[i],
                probability: probs[i],
            })
            .collect()
    }
}
