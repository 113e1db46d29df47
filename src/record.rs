//! What a tuning step leaves behind.

use core::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::evaluator::{Configuration, Evaluation};
use crate::stats;

const RULE: &str = "========================================";

/// One entry of the tuner's append-only history.
///
/// Holds the raw evaluator output so that runs can be analysed afterwards
/// or replayed into a fresh tuner.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistoryEntry {
    /// Zero-based step number.
    pub step: u64,
    /// The sampled configuration.
    pub config: Configuration,
    /// The lambda sweep the configuration was evaluated on.
    pub lambdas: Vec<f64>,
    /// Training scores `[lambda][epoch]`.
    pub train_scores: Vec<Vec<f64>>,
    /// Validation scores `[lambda][epoch]`.
    pub val_scores: Vec<Vec<f64>>,
}

impl HistoryEntry {
    /// Mean validation score over every lambda and epoch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScoreShape`] if the validation matrix is malformed.
    pub fn score(&self) -> Result<f64> {
        Ok(reduce_scores(&self.val_scores, self.lambdas.len())?.0)
    }

    /// Mean validation score per lambda, averaged over epochs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScoreShape`] if the validation matrix is malformed.
    pub fn lambda_scores(&self) -> Result<Vec<f64>> {
        Ok(reduce_scores(&self.val_scores, self.lambdas.len())?.1)
    }

    pub(crate) fn new(step: u64, config: Configuration, lambdas: &[f64], eval: Evaluation) -> Self {
        Self {
            step,
            config,
            lambdas: lambdas.to_vec(),
            train_scores: eval.train,
            val_scores: eval.val,
        }
    }
}

/// The outcome of a single [`Tuner::step`](crate::Tuner::step).
///
/// Its `Display` impl renders the step summary: the configuration, the score
/// per lambda, the average score and the elapsed wall time.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepRecord {
    /// Zero-based step number.
    pub step: u64,
    /// The sampled configuration.
    pub config: Configuration,
    /// The lambda sweep.
    pub lambdas: Vec<f64>,
    /// Validation score per lambda, averaged over epochs.
    pub lambda_scores: Vec<f64>,
    /// Validation score averaged over lambdas and epochs.
    pub score: f64,
    /// Wall time spent in the step, evaluation included.
    pub elapsed: Duration,
}

impl core::fmt::Display for StepRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "Configuration sampled:")?;
        for (name, value) in self.config.iter() {
            writeln!(f, "\t{name} : {value}")?;
        }
        writeln!(f, "{RULE}")?;
        for (lambda, v) in self.lambdas.iter().zip(&self.lambda_scores) {
            writeln!(f, "lambda: {lambda:.4} - V: {v:.6}")?;
        }
        writeln!(f, "Average V: {:.6}", self.score)?;
        write!(f, "Time elapsed: {:.2} s", self.elapsed.as_secs_f64())
    }
}

/// Reduce a `[lambda][epoch]` matrix to its overall mean and per-lambda means.
///
/// The matrix must have `n_lambdas` rows, at least one column, the same
/// number of columns in every row, and only finite entries.
pub(crate) fn reduce_scores(scores: &[Vec<f64>], n_lambdas: usize) -> Result<(f64, Vec<f64>)> {
    if scores.len() != n_lambdas {
        return Err(Error::ScoreShape(format!(
            "expected {n_lambdas} rows (one per lambda), got {}",
            scores.len()
        )));
    }
    let n_epochs = scores.first().map_or(0, Vec::len);
    if n_epochs == 0 {
        return Err(Error::ScoreShape("no epochs".into()));
    }
    if let Some((row, r)) = scores.iter().enumerate().find(|(_, r)| r.len() != n_epochs) {
        return Err(Error::ScoreShape(format!(
            "row {row} has {} epochs, expected {n_epochs}",
            r.len()
        )));
    }

    for (lambda, row) in scores.iter().enumerate() {
        if let Some((epoch, &value)) = row.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(Error::NonFiniteScore {
                lambda,
                epoch,
                value,
            });
        }
    }

    let per_lambda: Vec<f64> = scores
        .iter()
        .filter_map(|row| stats::mean(row))
        .collect();
    // Rows are equally long, so the mean of row means is the mean of all entries.
    let overall = stats::mean(&per_lambda).unwrap_or(0.0);
    if !overall.is_finite() || per_lambda.iter().any(|v| !v.is_finite()) {
        return Err(Error::ScoreShape("scores overflow when averaged".into()));
    }
    Ok((overall, per_lambda))
}
