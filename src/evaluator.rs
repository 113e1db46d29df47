//! The [`Evaluator`] trait: what the tuner asks the outside world to run.
//!
//! The tuner never trains anything itself. Each step it hands a sampled
//! [`Configuration`] and the lambda sweep to an evaluator, which returns
//! train and validation scores shaped `[lambda][epoch]`.
//!
//! Plain closures work out of the box:
//!
//! ```
//! use bayes_tuner::prelude::*;
//!
//! let mut tuner = Tuner::builder()
//!     .param("lr", [0.1, 0.01, 0.001], [0.0, 0.0, 0.0])
//!     .lambdas([0.1, 0.01])
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! let record = tuner
//!     .step(&mut |config: &Configuration, lambdas: &[f64]| {
//!         let lr = config.get("lr").and_then(ParamValue::as_f64).unwrap();
//!         let val: Vec<Vec<f64>> = lambdas.iter().map(|l| vec![1.0 - lr - l; 3]).collect();
//!         Ok::<_, Error>(Evaluation::new(val.clone(), val))
//!     })
//!     .unwrap();
//!
//! assert_eq!(record.lambda_scores.len(), 2);
//! ```
//!
//! Implement the trait on a struct to stop [`Tuner::optimize`](crate::Tuner::optimize)
//! early through [`after_step`](Evaluator::after_step):
//!
//! ```
//! use std::ops::ControlFlow;
//!
//! use bayes_tuner::prelude::*;
//!
//! struct UntilGoodEnough {
//!     target: f64,
//! }
//!
//! impl Evaluator for UntilGoodEnough {
//!     type Error = Error;
//!
//!     fn evaluate(&mut self, config: &Configuration, lambdas: &[f64]) -> Result<Evaluation> {
//!         let depth = config.get("depth").and_then(ParamValue::as_f64).unwrap();
//!         let val = lambdas.iter().map(|_| vec![depth / 4.0]).collect::<Vec<_>>();
//!         Ok(Evaluation::new(val.clone(), val))
//!     }
//!
//!     fn after_step(&mut self, record: &StepRecord) -> ControlFlow<()> {
//!         if record.score >= self.target {
//!             ControlFlow::Break(())
//!         } else {
//!             ControlFlow::Continue(())
//!         }
//!     }
//! }
//!
//! let mut tuner = Tuner::builder()
//!     .param("depth", [1i64, 2, 4], [0.0, 0.0, 0.0])
//!     .seed(3)
//!     .build()
//!     .unwrap();
//! let records = tuner.optimize(500, UntilGoodEnough { target: 1.0 }).unwrap();
//! assert_eq!(records.last().unwrap().score, 1.0);
//! ```

use core::ops::ControlFlow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::BoxError;
use crate::param::ParamValue;
use crate::record::StepRecord;

/// A full hyperparameter assignment, one value per name, in the tuner's
/// parameter order.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Configuration {
    entries: Vec<(String, ParamValue)>,
}

impl Configuration {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an assignment.
    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        self.entries.push((name.into(), value));
    }

    /// Returns the value assigned to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterates over `(name, value)` pairs in parameter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of assigned hyperparameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, ParamValue)> for Configuration {
    fn from_iter<I: IntoIterator<Item = (N, ParamValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }
}

impl core::fmt::Display for Configuration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}

/// Scores returned by an evaluator, both indexed `[lambda][epoch]`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Evaluation {
    /// Training scores per lambda and epoch.
    pub train: Vec<Vec<f64>>,
    /// Validation scores per lambda and epoch. The tuner optimizes these.
    pub val: Vec<Vec<f64>>,
}

impl Evaluation {
    /// Bundles train and validation score matrices.
    #[must_use]
    pub fn new(train: Vec<Vec<f64>>, val: Vec<Vec<f64>>) -> Self {
        Self { train, val }
    }
}

/// Runs an external evaluation of a sampled configuration.
///
/// The only required method is [`evaluate`](Evaluator::evaluate). Any
/// `FnMut(&Configuration, &[f64]) -> Result<Evaluation, E>` closure is an
/// evaluator.
///
/// Evaluations may take minutes; bounding their runtime is the evaluator's
/// job, the tuner neither times out nor retries.
pub trait Evaluator {
    /// The error type returned by [`evaluate`](Evaluator::evaluate).
    ///
    /// It is boxed into [`Error::Evaluation`](crate::Error::Evaluation) and
    /// can be recovered with `downcast_ref` on the error's source.
    type Error: Into<BoxError>;

    /// Evaluate `config` once for every lambda in `lambdas`.
    ///
    /// Both returned matrices must have one row per lambda.
    ///
    /// # Errors
    ///
    /// Any error of type [`Self::Error`]; it aborts the current step.
    fn evaluate(
        &mut self,
        config: &Configuration,
        lambdas: &[f64],
    ) -> Result<Evaluation, Self::Error>;

    /// Called after each successful step.
    ///
    /// Return `ControlFlow::Break(())` to stop [`Tuner::optimize`](crate::Tuner::optimize).
    ///
    /// Default: always continues.
    fn after_step(&mut self, _record: &StepRecord) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

impl<F, E> Evaluator for F
where
    F: FnMut(&Configuration, &[f64]) -> Result<Evaluation, E>,
    E: Into<BoxError>,
{
    type Error = E;

    fn evaluate(&mut self, config: &Configuration, lambdas: &[f64]) -> Result<Evaluation, E> {
        self(config, lambdas)
    }
}
