use core::ops::ControlFlow;

use bayes_tuner::prelude::*;

/// Scores depend only on `width`; `width = 64` is best by a wide margin.
fn width_objective(config: &Configuration, lambdas: &[f64]) -> Result<Evaluation> {
    let width = config.get("width").and_then(ParamValue::as_f64).unwrap();
    let base = if (width - 64.0).abs() < f64::EPSILON { 2.0 } else { 0.0 };
    let val: Vec<Vec<f64>> = lambdas.iter().map(|l| vec![base - l; 2]).collect();
    Ok(Evaluation::new(val.clone(), val))
}

struct StopAfter {
    remaining: usize,
}

impl Evaluator for StopAfter {
    type Error = Error;

    fn evaluate(&mut self, config: &Configuration, lambdas: &[f64]) -> Result<Evaluation> {
        width_objective(config, lambdas)
    }

    fn after_step(&mut self, record: &StepRecord) -> ControlFlow<()> {
        assert!(record.score.is_finite());
        self.remaining -= 1;
        if self.remaining == 0 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

#[test]
fn test_optimize_runs_requested_steps() {
    let mut tuner = Tuner::builder()
        .param_uniform("width", [16i64, 32, 64])
        .seed(5)
        .build()
        .unwrap();

    let records = tuner.optimize(25, width_objective).unwrap();

    assert_eq!(records.len(), 25);
    assert_eq!(tuner.n_steps(), 25);
    let steps: Vec<u64> = records.iter().map(|r| r.step).collect();
    assert_eq!(steps, (0..25).collect::<Vec<u64>>());
}

#[test]
fn test_after_step_break_stops_early() {
    let mut tuner = Tuner::builder()
        .param_uniform("width", [16i64, 32, 64])
        .seed(5)
        .build()
        .unwrap();

    let evaluator = StopAfter { remaining: 4 };
    let records = tuner.optimize(100, evaluator).unwrap();

    assert_eq!(records.len(), 4);
    assert_eq!(tuner.n_steps(), 4);
}

#[test]
fn test_optimize_stops_at_first_failure() {
    let mut tuner = Tuner::builder()
        .param_uniform("width", [16i64, 32, 64])
        .seed(5)
        .build()
        .unwrap();

    let mut calls = 0;
    let err = tuner
        .optimize(10, |config: &Configuration, lambdas: &[f64]| {
            calls += 1;
            if calls == 3 {
                return Err(Error::InvalidState("simulated crash"));
            }
            width_objective(config, lambdas)
        })
        .unwrap_err();

    assert!(err.is_evaluation());
    assert_eq!(tuner.n_steps(), 2);
}

#[test]
fn test_tuner_concentrates_on_best_value() {
    let mut tuner = Tuner::builder()
        .param_uniform("width", [16i64, 32, 64])
        .seed(11)
        .build()
        .unwrap();

    tuner.optimize(200, width_objective).unwrap();

    let sampler = tuner.sampler("width").unwrap();
    let probs = sampler.probabilities();
    assert!(probs[2] > probs[0] && probs[2] > probs[1], "{probs:?}");

    let freqs: Vec<usize> = sampler.stats().iter().map(|s| s.freq).collect();
    assert!(freqs[2] > freqs[0] && freqs[2] > freqs[1], "{freqs:?}");
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let run = || {
        let mut tuner = Tuner::builder()
            .param_uniform("width", [16i64, 32, 64])
            .param_uniform("act", ["relu", "gelu"])
            .seed(99)
            .build()
            .unwrap();
        tuner
            .optimize(30, width_objective)
            .unwrap()
            .into_iter()
            .map(|r| r.config)
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}
