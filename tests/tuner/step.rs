use bayes_tuner::prelude::*;

fn fixed_scores(_: &Configuration, _: &[f64]) -> Result<Evaluation> {
    Ok(Evaluation::new(
        vec![vec![0.5, 0.6], vec![0.4, 0.5]],
        vec![vec![2.0, 4.0], vec![1.0, 3.0]],
    ))
}

fn two_param_tuner() -> Tuner {
    Tuner::builder()
        .param("lr", [0.1, 0.01, 0.001], [0.0, 0.0, 0.0])
        .param("n_heads", [1i64, 2, 4], [0.0, 0.0, 0.0])
        .lambdas([0.1, 0.01])
        .seed(42)
        .build()
        .unwrap()
}

#[test]
fn test_step_averages_validation_scores() {
    let mut tuner = two_param_tuner();
    let mut evaluator = fixed_scores;

    let record = tuner.step(&mut evaluator).unwrap();

    assert_eq!(record.score, 2.5);
    assert_eq!(record.lambda_scores, vec![3.0, 2.0]);
    assert_eq!(record.lambdas, vec![0.1, 0.01]);
    assert_eq!(record.config.len(), 2);
}

#[test]
fn test_every_sampler_receives_the_same_feedback() {
    let mut tuner = two_param_tuner();
    let mut evaluator = fixed_scores;
    tuner.step(&mut evaluator).unwrap();

    for (name, sampler) in tuner.samplers() {
        assert_eq!(sampler.global_scores(), &[2.5], "sampler {name}");
        let idx = sampler.last_selected().unwrap();
        assert_eq!(sampler.stats()[idx].freq, 1);
        assert_eq!(sampler.stats()[idx].lambda_scores, vec![vec![3.0, 2.0]]);
    }
}

#[test]
fn test_config_matches_sampler_selection() {
    let mut tuner = two_param_tuner();
    let mut evaluator = fixed_scores;
    let record = tuner.step(&mut evaluator).unwrap();

    for (name, value) in record.config.iter() {
        let sampler = tuner.sampler(name).unwrap();
        assert_eq!(&sampler.values()[sampler.last_selected().unwrap()], value);
    }
}

#[test]
fn test_history_keeps_raw_scores() {
    let mut tuner = two_param_tuner();
    let mut evaluator = fixed_scores;
    let record = tuner.step(&mut evaluator).unwrap();

    let history = tuner.history();
    assert_eq!(history.len(), 1);
    let entry = &history[0];
    assert_eq!(entry.step, record.step);
    assert_eq!(entry.config, record.config);
    assert_eq!(entry.lambdas, vec![0.1, 0.01]);
    assert_eq!(entry.train_scores, vec![vec![0.5, 0.6], vec![0.4, 0.5]]);
    assert_eq!(entry.val_scores, vec![vec![2.0, 4.0], vec![1.0, 3.0]]);
}

#[test]
fn test_evaluator_sees_config_and_lambdas() {
    let mut tuner = two_param_tuner();
    let mut seen = Vec::new();

    tuner
        .step(&mut |config: &Configuration, lambdas: &[f64]| {
            seen.push((config.clone(), lambdas.to_vec()));
            fixed_scores(config, lambdas)
        })
        .unwrap();

    assert_eq!(seen.len(), 1);
    let (config, lambdas) = &seen[0];
    assert!(config.get("lr").is_some());
    assert!(config.get("n_heads").and_then(ParamValue::as_i64).is_some());
    assert_eq!(lambdas, &vec![0.1, 0.01]);
}

#[test]
fn test_record_display_is_step_summary() {
    let mut tuner = two_param_tuner();
    let mut evaluator = fixed_scores;
    let record = tuner.step(&mut evaluator).unwrap();

    let text = record.to_string();
    assert!(text.contains("Configuration sampled:"));
    assert!(text.contains("\tlr : "));
    assert!(text.contains("\tn_heads : "));
    assert!(text.contains("lambda: 0.1000 - V: 3.000000"));
    assert!(text.contains("lambda: 0.0100 - V: 2.000000"));
    assert!(text.contains("Average V: 2.500000"));
    assert!(text.contains("Time elapsed: "));
}

#[test]
fn test_best_entry_tracks_highest_score() {
    let mut tuner = Tuner::builder()
        .param_uniform("depth", [1i64, 2, 3])
        .lambdas([0.1])
        .seed(8)
        .build()
        .unwrap();

    let records = tuner
        .optimize(30, |config: &Configuration, _: &[f64]| {
            let depth = config.get("depth").and_then(ParamValue::as_f64).unwrap();
            Ok::<_, Error>(Evaluation::new(vec![vec![depth]], vec![vec![depth]]))
        })
        .unwrap();

    let best = tuner.best_entry().unwrap();
    let max = records.iter().map(|r| r.score).fold(f64::MIN, f64::max);
    assert_eq!(best.score().unwrap(), max);
}
