use bayes_tuner::sampler::ParamSampler;

/// Chi-square statistic of `counts` against `expected` probabilities.
fn chi_square(counts: &[usize], expected: &[f64]) -> f64 {
    let n: usize = counts.iter().sum();
    counts
        .iter()
        .zip(expected)
        .map(|(&c, &p)| {
            let e = n as f64 * p;
            (c as f64 - e).powi(2) / e
        })
        .sum()
}

fn draw_counts(sampler: &mut ParamSampler, rng: &mut fastrand::Rng, n: usize) -> Vec<usize> {
    let mut counts = vec![0; sampler.values().len()];
    for _ in 0..n {
        sampler.sample(rng).unwrap();
        counts[sampler.last_selected().unwrap()] += 1;
    }
    counts
}

#[test]
fn test_first_draw_is_uniform() {
    let mut sampler =
        ParamSampler::new(vec![0.1.into(), 0.01.into(), 0.001.into()], vec![0.0; 3], 2.0).unwrap();
    let mut rng = fastrand::Rng::with_seed(2024);

    let counts = draw_counts(&mut sampler, &mut rng, 3000);
    let stat = chi_square(&counts, &[1.0 / 3.0; 3]);

    // 99.9th percentile of chi-square with 2 degrees of freedom.
    assert!(stat < 13.82, "chi-square {stat} too large for counts {counts:?}");
}

#[test]
fn test_draws_follow_prior_softmax() {
    let mut sampler = ParamSampler::new(
        vec![1i64.into(), 2i64.into(), 4i64.into(), 8i64.into()],
        vec![0.0, 1.0, -1.0, 0.5],
        2.0,
    )
    .unwrap();
    let expected = sampler.probabilities();
    let mut rng = fastrand::Rng::with_seed(77);

    let counts = draw_counts(&mut sampler, &mut rng, 8000);
    let stat = chi_square(&counts, &expected);

    // 99.9th percentile of chi-square with 3 degrees of freedom.
    assert!(stat < 16.27, "chi-square {stat} too large for counts {counts:?}");
}

#[test]
fn test_seeded_sampling_is_reproducible() {
    let make = || ParamSampler::uniform(vec!["relu".into(), "gelu".into(), "tanh".into()], 2.0);
    let mut a = make().unwrap();
    let mut b = make().unwrap();
    let mut rng_a = fastrand::Rng::with_seed(42);
    let mut rng_b = fastrand::Rng::with_seed(42);

    for _ in 0..50 {
        let va = a.sample(&mut rng_a).unwrap().clone();
        let vb = b.sample(&mut rng_b).unwrap().clone();
        assert_eq!(va, vb);
        a.update_stat(0.5, &[]).unwrap();
        b.update_stat(0.5, &[]).unwrap();
    }
}
