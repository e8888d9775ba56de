//! Symbolic Regression with Genetic Programming
//!
//! Evolves an expression that fits samples of f(x) = x^2 + 2*x + 1, then
//! prints the best program in text and JSON form.
//!
//! Run with `RUST_LOG=info` to see per-generation progress.

use xgp_evo::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("=== Symbolic Regression with GP ===\n");

    // Training and validation data from f(x) = x^2 + 2*x + 1
    let sample = |xs: &[f64]| -> GpResult<Dataset> {
        let rows: Vec<Vec<f64>> = xs.iter().map(|&x| vec![x]).collect();
        let y = xs.iter().map(|x| x * x + 2.0 * x + 1.0).collect();
        Dataset::from_rows(&rows, y, None)
    };
    let train_x: Vec<f64> = (-10..=10).map(|i| i as f64 / 2.0).collect();
    let val_x: Vec<f64> = (-9..=9).map(|i| i as f64 / 2.0 + 0.25).collect();
    let train = sample(&train_x)?;
    let val = sample(&val_x)?;

    println!("Target function: f(x) = x^2 + 2*x + 1");
    println!("Training points: {}", train.n_rows());
    println!();

    let config = GpConfig::new()
        .funcs("add,sub,mul,div")
        .heights(2, 5)
        .populations(4, 200)
        .generations(40)
        .parsimony(1e-3)
        .polish(20)
        .eval_metric("r2")
        .seed(42)
        .verbose(true);

    let mut estimator = GpEstimator::new(config)?;
    let program = estimator.fit(&train, Some(&val))?;

    println!("{}", estimator.stats().summary());
    println!();
    println!("Best program: {}", program);
    println!("Height: {}, size: {}", program.height(), program.size());
    if let Some(best) = estimator.best() {
        println!("Fitness: {:.6}", best.fitness_or_worst());
    }
    println!("JSON: {}", program.to_json()?);

    println!("\nSample predictions:");
    for x in [-3.0, -1.0, 0.0, 1.5, 4.0] {
        let expected = x * x + 2.0 * x + 1.0;
        println!(
            "  f({:5.1}) = {:8.3}  (expected {:8.3})",
            x,
            program.predict_row(&[x])?,
            expected
        );
    }

    Ok(())
}
