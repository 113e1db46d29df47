use bayes_tuner::prelude::*;

#[derive(Debug)]
struct OutOfMemory;

impl core::fmt::Display for OutOfMemory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "CUDA out of memory")
    }
}

impl core::error::Error for OutOfMemory {}

fn tuner() -> Tuner {
    Tuner::builder()
        .param_uniform("lr", [0.1, 0.01, 0.001])
        .param_uniform("dropout", [0.0, 0.1, 0.2])
        .lambdas([0.1, 0.01])
        .seed(3)
        .build()
        .unwrap()
}

fn good(_: &Configuration, _: &[f64]) -> Result<Evaluation> {
    Ok(Evaluation::new(vec![vec![1.0]; 2], vec![vec![1.0]; 2]))
}

fn freqs(tuner: &Tuner) -> Vec<Vec<usize>> {
    tuner
        .samplers()
        .map(|(_, s)| s.stats().iter().map(|v| v.freq).collect())
        .collect()
}

#[test]
fn test_failing_evaluator_leaves_counts_unchanged() {
    let mut tuner = tuner();
    let mut ok = good;
    tuner.step(&mut ok).unwrap();
    let before = freqs(&tuner);

    let mut failing =
        |_: &Configuration, _: &[f64]| Err::<Evaluation, OutOfMemory>(OutOfMemory);
    let err = tuner.step(&mut failing).unwrap_err();

    assert!(err.is_evaluation());
    assert_eq!(freqs(&tuner), before);
    assert_eq!(tuner.n_steps(), 1);
    for (_, sampler) in tuner.samplers() {
        assert_eq!(sampler.global_scores().len(), 1);
    }
}

#[test]
fn test_evaluator_error_is_preserved() {
    use core::error::Error as _;

    let mut tuner = tuner();
    let mut failing =
        |_: &Configuration, _: &[f64]| Err::<Evaluation, OutOfMemory>(OutOfMemory);
    let err = tuner.step(&mut failing).unwrap_err();

    assert!(matches!(err, Error::Evaluation(_)));
    assert!(err.source().unwrap().downcast_ref::<OutOfMemory>().is_some());
    assert!(err.to_string().contains("CUDA out of memory"));
}

#[test]
fn test_string_errors_are_accepted() {
    let mut tuner = tuner();
    let mut failing = |_: &Configuration, _: &[f64]| Err::<Evaluation, &str>("diverged");
    let err = tuner.step(&mut failing).unwrap_err();
    assert_eq!(err.to_string(), "evaluation failed: diverged");
}

#[test]
fn test_wrong_lambda_rows_abort_step() {
    let mut tuner = tuner();
    let mut one_row =
        |_: &Configuration, _: &[f64]| Ok::<_, Error>(Evaluation::new(vec![vec![1.0]], vec![vec![1.0]]));
    let err = tuner.step(&mut one_row).unwrap_err();

    assert!(matches!(err, Error::ScoreShape(_)));
    assert!(freqs(&tuner).iter().flatten().all(|&f| f == 0));
    assert_eq!(tuner.n_steps(), 0);
}

#[test]
fn test_ragged_scores_abort_step() {
    let mut tuner = tuner();
    let mut ragged = |_: &Configuration, _: &[f64]| {
        Ok::<_, Error>(Evaluation::new(
            vec![vec![1.0, 1.0], vec![1.0, 1.0]],
            vec![vec![1.0, 1.0], vec![1.0]],
        ))
    };
    let err = tuner.step(&mut ragged).unwrap_err();
    assert!(err.is_evaluation());
    assert!(freqs(&tuner).iter().flatten().all(|&f| f == 0));
}

#[test]
fn test_tuner_recovers_after_failure() {
    let mut tuner = tuner();
    let mut failing = |_: &Configuration, _: &[f64]| Err::<Evaluation, &str>("boom");
    assert!(tuner.step(&mut failing).is_err());

    let mut ok = good;
    let record = tuner.step(&mut ok).unwrap();
    assert_eq!(record.step, 0);
    assert_eq!(tuner.n_steps(), 1);
}

#[test]
fn test_non_finite_scores_abort_step() {
    let mut tuner = tuner();
    let mut ok = good;
    tuner.step(&mut ok).unwrap();
    let before = freqs(&tuner);

    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let mut non_finite = |_: &Configuration, _: &[f64]| {
            Ok::<_, Error>(Evaluation::new(
                vec![vec![1.0]; 2],
                vec![vec![1.0], vec![bad]],
            ))
        };
        let err = tuner.step(&mut non_finite).unwrap_err();
        assert!(err.is_evaluation());
        assert!(matches!(err, Error::NonFiniteScore { lambda: 1, epoch: 0, .. }));
    }

    let mut nan_train = |_: &Configuration, _: &[f64]| {
        Ok::<_, Error>(Evaluation::new(vec![vec![f64::NAN]; 2], vec![vec![1.0]; 2]))
    };
    assert!(tuner.step(&mut nan_train).is_err());

    assert_eq!(freqs(&tuner), before);
    assert_eq!(tuner.n_steps(), 1);
    for (_, sampler) in tuner.samplers() {
        assert_eq!(sampler.global_scores(), &[1.0]);
        assert!(sampler.probabilities().iter().all(|p| p.is_finite()));
    }
}

#[test]
fn test_sampling_follows_distribution_after_rejected_nan() {
    let mut tuner = Tuner::builder()
        .param_uniform("lr", [0.1, 0.01, 0.001])
        .lambdas([0.1])
        .seed(21)
        .build()
        .unwrap();

    let mut nan = |_: &Configuration, _: &[f64]| {
        Ok::<_, Error>(Evaluation::new(vec![vec![0.0]], vec![vec![f64::NAN]]))
    };
    assert!(tuner.step(&mut nan).is_err());

    let mut flat = |_: &Configuration, _: &[f64]| {
        Ok::<_, Error>(Evaluation::new(vec![vec![0.0]], vec![vec![0.0]]))
    };
    let mut counts = [0usize; 3];
    for _ in 0..300 {
        let record = tuner.step(&mut flat).unwrap();
        let lr = tuner.sampler("lr").unwrap();
        counts[lr.index_of(record.config.get("lr").unwrap()).unwrap()] += 1;
    }
    assert!(counts.iter().all(|&c| c > 50), "{counts:?}");
}
