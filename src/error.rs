/// Boxed error type used to carry evaluator failures through [`Error::Evaluation`].
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a sampler gets a different number of values and priors.
    #[error("length mismatch: {values} candidate values but {priors} priors")]
    LengthMismatch {
        /// The number of candidate values.
        values: usize,
        /// The number of priors.
        priors: usize,
    },

    /// Returned when a sampler is created without candidate values.
    #[error("candidate values cannot be empty")]
    EmptyValues,

    /// Returned when a prior score is NaN or infinite.
    #[error("invalid prior at index {index}: {value} is not finite")]
    InvalidPrior {
        /// Position of the prior among the candidate values.
        index: usize,
        /// The offending prior.
        value: f64,
    },

    /// Returned when the prior weight is not a positive finite number.
    #[error("invalid prior weight: {0} must be positive and finite")]
    InvalidPriorWeight(f64),

    /// Returned when the same hyperparameter name is registered twice.
    #[error("duplicate hyperparameter '{0}'")]
    DuplicateParameter(String),

    /// Returned when a tuner is built with no lambdas.
    #[error("lambdas cannot be empty")]
    EmptyLambdas,

    /// Returned when statistics are updated before any value was sampled.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Returned when the evaluator fails. The evaluator's own error is kept as the source.
    #[error("evaluation failed: {0}")]
    Evaluation(#[source] BoxError),

    /// Returned when the evaluator's score matrix does not match `[lambda][epoch]`.
    #[error("malformed scores: {0}")]
    ScoreShape(String),

    /// Returned when the evaluator reports a NaN or infinite score.
    #[error("non-finite score {value} for lambda {lambda} at epoch {epoch}")]
    NonFiniteScore {
        /// Row of the score matrix.
        lambda: usize,
        /// Column of the score matrix.
        epoch: usize,
        /// The offending score.
        value: f64,
    },

    /// Returned when a sampler's probabilities do not form a finite distribution.
    #[error("degenerate sampling distribution: {0:?}")]
    DegenerateDistribution(Vec<f64>),

    /// Returned when a history entry names a hyperparameter the tuner does not have.
    #[error("unknown hyperparameter '{0}'")]
    UnknownParameter(String),

    /// Returned when a history entry has no value for one of the tuner's hyperparameters.
    #[error("history entry {step} has no value for hyperparameter '{name}'")]
    MissingParameter {
        /// Step number of the entry.
        step: u64,
        /// The hyperparameter name.
        name: String,
    },

    /// Returned when a history entry was evaluated on a different lambda sweep.
    #[error("history entry {step} used lambdas {found:?}, tuner sweeps {expected:?}")]
    LambdaMismatch {
        /// Step number of the entry.
        step: u64,
        /// The tuner's lambdas.
        expected: Vec<f64>,
        /// The entry's lambdas.
        found: Vec<f64>,
    },

    /// Returned when a history entry holds a value that is not a candidate.
    #[error("value {value} is not a candidate of hyperparameter '{name}'")]
    UnknownValue {
        /// The hyperparameter name.
        name: String,
        /// The rendered value.
        value: String,
    },

    /// Returned when a storage operation fails.
    #[cfg(feature = "journal")]
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Returns `true` for errors caused by an invalid tuner or sampler setup.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::LengthMismatch { .. }
                | Self::EmptyValues
                | Self::InvalidPrior { .. }
                | Self::InvalidPriorWeight(_)
                | Self::DuplicateParameter(_)
                | Self::EmptyLambdas
        )
    }

    /// Returns `true` when a sampler was used out of order or its statistics cannot be sampled from.
    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_) | Self::DegenerateDistribution(_))
    }

    /// Returns `true` when the evaluator failed or returned unusable scores.
    #[must_use]
    pub fn is_evaluation(&self) -> bool {
        matches!(
            self,
            Self::Evaluation(_) | Self::ScoreShape(_) | Self::NonFiniteScore { .. }
        )
    }
}

pub type Result<T> = core::result::Result<T, Error>;
