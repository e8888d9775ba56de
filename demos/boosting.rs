//! Gradient Boosting of Evolved Programs
//!
//! Fits a boosted ensemble of small programs to a two-feature target with
//! row and column subsampling, line search and early stopping on a
//! validation set.
//!
//! Run with `RUST_LOG=info` to see per-round progress.

use xgp_evo::prelude::*;

fn make_dataset(n: usize, offset: usize) -> GpResult<Dataset> {
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            let k = (i + offset) as f64;
            vec![(k * 0.37).sin() * 3.0, (k * 0.11).cos() * 2.0]
        })
        .collect();
    let y = rows
        .iter()
        .map(|r| r[0] * r[1] + (r[0] * 0.5).cos() - 0.3 * r[1])
        .collect();
    Dataset::from_rows(&rows, y, None)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("=== Gradient Boosting with GP ===\n");

    let train = make_dataset(200, 0)?;
    let val = make_dataset(60, 1000)?;

    let config = FitConfig {
        flavor: "boosting".to_string(),
        gp: GpConfig::new()
            .loss_metric("mse")
            .eval_metric("rmse")
            .funcs("add,sub,mul,cos")
            .heights(1, 3)
            .populations(2, 50)
            .generations(10)
            .seed(7)
            .verbose(true),
        boosting: BoostingConfig::new()
            .rounds(30)
            .learning_rate(0.3)
            .line_search(true)
            .sampling(0.8, 1.0)
            .early_stopping(5, true),
        ..FitConfig::default()
    };

    let model = fit(&config, &train, Some(&val))?;
    if let Model::Ensemble(ensemble) = &model {
        println!("Learners kept: {}", ensemble.n_learners());
        println!("Base prediction: {:.4}", ensemble.base);
    }

    let preds = model.predict(&val)?;
    let rmse = metric_from_name("rmse")?.score(val.y(), &preds, None);
    println!("Validation RMSE: {:.4}", rmse);
    println!("\nModel JSON ({} bytes)", model.to_json()?.len());

    Ok(())
}
