//! Tune a simulated grid-world agent.
//!
//! The evaluator stands in for a real training run: it fakes a learning
//! curve per lambda from the sampled configuration, with a little noise, and
//! reports the last few epochs as validation scores. The tuner only sees
//! those numbers, exactly as it would with a real agent.
//!
//! Run with: `cargo run --example grid_world`

use core::ops::ControlFlow;

use bayes_tuner::prelude::*;

const N_EPOCHS: usize = 20;
const N_VAL_EPOCHS: usize = 5;

struct SimulatedAgent {
    rng: fastrand::Rng,
    target: f64,
}

impl SimulatedAgent {
    /// Return per epoch for one lambda. Peaks at lr = 5e-4, 4 heads, `gelu`
    /// and lambda = 1e-3.
    fn learning_curve(&mut self, lr: f64, n_heads: f64, gelu: bool, lambda: f64) -> Vec<f64> {
        let lr_fit = 1.0 - (lr.log10() - 5e-4_f64.log10()).abs() / 2.0;
        let heads_fit = 1.0 - (n_heads - 4.0).abs() / 8.0;
        let lambda_fit = 1.0 - (lambda.log10() + 3.0).abs();
        let ceiling = lr_fit * heads_fit * lambda_fit + if gelu { 0.1 } else { 0.0 };

        (0..N_EPOCHS)
            .map(|epoch| {
                let progress = 1.0 - (-(epoch as f64) / 5.0).exp();
                ceiling * progress + (self.rng.f64() - 0.5) * 0.05
            })
            .collect()
    }
}

impl Evaluator for SimulatedAgent {
    type Error = Error;

    fn evaluate(&mut self, config: &Configuration, lambdas: &[f64]) -> Result<Evaluation> {
        let lr = config.get("lr").and_then(ParamValue::as_f64).unwrap_or(1e-3);
        let n_heads = config.get("n_heads").and_then(ParamValue::as_f64).unwrap_or(1.0);
        let gelu = config.get("activation").and_then(ParamValue::as_str) == Some("gelu");

        let mut train = Vec::with_capacity(lambdas.len());
        let mut val = Vec::with_capacity(lambdas.len());
        for &lambda in lambdas {
            let curve = self.learning_curve(lr, n_heads, gelu, lambda);
            val.push(curve[N_EPOCHS - N_VAL_EPOCHS..].to_vec());
            train.push(curve);
        }
        Ok(Evaluation::new(train, val))
    }

    fn after_step(&mut self, record: &StepRecord) -> ControlFlow<()> {
        println!("{record}");
        if record.score >= self.target {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

fn main() -> bayes_tuner::Result<()> {
    let mut tuner = Tuner::builder()
        .param("lr", [1e-2, 1e-3, 5e-4, 1e-4], [0.0, 0.1, 0.1, 0.0])
        .param("n_heads", [1i64, 2, 4, 8], [0.0, 0.0, 0.0, 0.0])
        .param_uniform("activation", ["relu", "gelu", "tanh"])
        .lambdas(DEFAULT_LAMBDAS)
        .seed(2024)
        .build()?;

    let agent = SimulatedAgent {
        rng: fastrand::Rng::with_seed(7),
        target: 0.85,
    };
    let records = tuner.optimize(60, agent)?;
    println!("Ran {} steps", records.len());

    if let Some(best) = tuner.best_entry() {
        println!("Best configuration: {} (V = {:.4})", best.config, best.score()?);
    }

    for (name, sampler) in tuner.samplers() {
        println!("\n{name}");
        for value in sampler.summary() {
            println!(
                "  {:<8} p = {:.3}  n = {:<3} advantage = {:+.4}",
                value.value.to_string(),
                value.probability,
                value.freq,
                value.biased_advantage,
            );
        }
    }

    Ok(())
}
