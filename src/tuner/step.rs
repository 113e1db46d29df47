use std::time::Instant;

use crate::error::{Error, Result};
use crate::evaluator::{Configuration, Evaluator};
use crate::record::{HistoryEntry, StepRecord, reduce_scores};
use crate::types::Verbosity;

use super::Tuner;

impl Tuner {
    /// Run one tuning step.
    ///
    /// 1. Sample a value for every hyperparameter.
    /// 2. Ask `evaluator` to score the configuration on every lambda.
    /// 3. Average the validation scores: `score` over everything,
    ///    `lambda_scores` over epochs.
    /// 4. Append a [`HistoryEntry`] to the storage.
    /// 5. Feed `score` and `lambda_scores` back into every sampler.
    ///
    /// A failure in steps 2 to 4 aborts the step before any sampler statistic
    /// changes. Only the samplers' last selection is overwritten, which the
    /// next step overwrites again.
    ///
    /// # Errors
    ///
    /// - [`Error::Evaluation`] wrapping the evaluator's error.
    /// - [`Error::ScoreShape`] if the returned matrices are not `[lambda][epoch]`.
    /// - [`Error::NonFiniteScore`] if a returned score is NaN or infinite.
    /// - [`Error::DegenerateDistribution`] if a sampler cannot draw.
    /// - A storage error if the history entry cannot be persisted.
    pub fn step<E: Evaluator>(&mut self, evaluator: &mut E) -> Result<StepRecord> {
        let start = Instant::now();

        self.log_probabilities();
        let config = self.sample_configuration()?;
        if self.verbosity >= Verbosity::Detailed {
            trace_debug!(config = %config, "configuration sampled");
        }

        let eval = evaluator
            .evaluate(&config, &self.lambdas)
            .map_err(|e| Error::Evaluation(e.into()))?;
        reduce_scores(&eval.train, self.lambdas.len())?;
        let (score, lambda_scores) = reduce_scores(&eval.val, self.lambdas.len())?;

        let step = self.storage.next_step();
        self.storage
            .push(HistoryEntry::new(step, config.clone(), &self.lambdas, eval))?;

        for (_, sampler) in &mut self.samplers {
            sampler.update_stat(score, &lambda_scores)?;
        }

        let record = StepRecord {
            step,
            config,
            lambdas: self.lambdas.clone(),
            lambda_scores,
            score,
            elapsed: start.elapsed(),
        };

        if self.verbosity >= Verbosity::Summary {
            trace_info!(
                step = record.step,
                score = record.score,
                elapsed_s = record.elapsed.as_secs_f64(),
                "step completed"
            );
        }

        Ok(record)
    }

    /// Run up to `n_steps` tuning steps sequentially.
    ///
    /// Stops early when [`Evaluator::after_step`] breaks. There are no
    /// retries: the first failing step aborts the run and its error is
    /// returned. Steps completed before the failure remain in the history.
    ///
    /// # Errors
    ///
    /// Any error of [`step`](Self::step).
    pub fn optimize(
        &mut self,
        n_steps: usize,
        mut evaluator: impl Evaluator,
    ) -> Result<Vec<StepRecord>> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("optimize", n_steps).entered();

        let mut records = Vec::with_capacity(n_steps);
        for _ in 0..n_steps {
            let record = self.step(&mut evaluator)?;
            let flow = evaluator.after_step(&record);
            records.push(record);
            if flow.is_break() {
                trace_info!(steps = records.len(), "stopped early");
                break;
            }
        }
        Ok(records)
    }

    fn sample_configuration(&mut self) -> Result<Configuration> {
        let mut config = Configuration::new();
        for (name, sampler) in &mut self.samplers {
            config.insert(name.clone(), sampler.sample(&mut self.rng)?.clone());
        }
        Ok(config)
    }

    fn log_probabilities(&self) {
        #[cfg(feature = "tracing")]
        if self.verbosity >= Verbosity::Detailed {
            for (name, sampler) in &self.samplers {
                tracing::debug!(param = %name, probabilities = ?sampler.probabilities(), "sampling distribution");
            }
        }
    }
}
