//! Gradient boosting of evolved programs
//!
//! Each round fits a fresh [`GpEstimator`] on the pseudo-residuals of the
//! current ensemble and appends the resulting program with a step size.
//! Predictions on training and validation data are maintained incrementally
//! so a round never re-evaluates earlier learners.

use std::fmt;

use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::algorithms::early_stopping::EarlyStopping;
use crate::algorithms::estimator::GpEstimator;
use crate::algorithms::line_search::step_multiplier;
use crate::config::{make_rng, BoostingConfig, GpConfig};
use crate::dataset::{sample_indices, Dataset};
use crate::diagnostics::RoundStats;
use crate::error::{GpError, GpResult};
use crate::metrics::{DifferentiableMetric, Metric};
use crate::program::Program;

/// A program and the step its output is scaled by
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeakLearner {
    pub program: Program,
    pub step: f64,
}

/// Additive ensemble: `base + Σ step_i · program_i(x)`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ensemble {
    /// Constant starting prediction
    pub base: f64,
    /// Learners in the order they were fitted
    pub learners: Vec<WeakLearner>,
}

impl Ensemble {
    /// Create an ensemble predicting `base` everywhere
    pub fn new(base: f64) -> Self {
        Self {
            base,
            learners: Vec::new(),
        }
    }

    /// Append a learner
    pub fn push(&mut self, program: Program, step: f64) {
        self.learners.push(WeakLearner { program, step });
    }

    pub fn n_learners(&self) -> usize {
        self.learners.len()
    }

    /// Keep only the first `n` learners
    pub fn truncate(&mut self, n: usize) {
        self.learners.truncate(n);
    }

    /// Predict every row of `dataset`, accumulating learners in order
    pub fn predict(&self, dataset: &Dataset) -> GpResult<Vec<f64>> {
        let mut preds = vec![self.base; dataset.n_rows()];
        for learner in &self.learners {
            let h = learner.program.predict(dataset)?;
            for (p, hi) in preds.iter_mut().zip(&h) {
                *p += learner.step * hi;
            }
        }
        Ok(preds)
    }

    /// Predict a single row, checking that every learner's features exist
    pub fn predict_row(&self, row: &[f64]) -> GpResult<f64> {
        self.learners.iter().try_fold(self.base, |acc, learner| {
            Ok(acc + learner.step * learner.program.predict_row(row)?)
        })
    }

    pub fn to_json(&self) -> GpResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> GpResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for Ensemble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.base)?;
        for learner in &self.learners {
            write!(f, " + {:?} * {}", learner.step, learner.program)?;
        }
        Ok(())
    }
}

/// Gradient boosting meta-estimator
#[derive(Debug)]
pub struct Booster {
    gp: GpConfig,
    boosting: BoostingConfig,
    loss_metric: Box<dyn Metric>,
    eval_metric: Box<dyn Metric>,
    ensemble: Option<Ensemble>,
    history: Vec<RoundStats>,
}

impl Booster {
    /// Create a booster; the loss metric must be differentiable
    pub fn new(gp: GpConfig, boosting: BoostingConfig) -> GpResult<Self> {
        let loss_metric = gp.build_loss_metric()?;
        if loss_metric.as_differentiable().is_none() {
            return Err(GpError::NonDifferentiableMetric(
                loss_metric.name().to_string(),
            ));
        }
        gp.validate()?;
        boosting.validate()?;
        let eval_metric = gp.build_eval_metric()?;
        Ok(Self {
            gp,
            boosting,
            loss_metric,
            eval_metric,
            ensemble: None,
            history: Vec::new(),
        })
    }

    /// Ensemble of the last fit
    pub fn ensemble(&self) -> Option<&Ensemble> {
        self.ensemble.as_ref()
    }

    /// Per-round statistics of the last fit
    pub fn history(&self) -> &[RoundStats] {
        &self.history
    }

    /// Fit an ensemble on `train`, monitoring `val` when supplied
    pub fn fit(&mut self, train: &Dataset, val: Option<&Dataset>) -> GpResult<&Ensemble> {
        let val = val.filter(|v| v.n_rows() > 0);
        if val.is_none()
            && (self.boosting.n_early_stopping_rounds > 0 || self.boosting.use_best_rounds)
        {
            return Err(GpError::InvalidConfiguration(
                "early stopping requires validation data".to_string(),
            ));
        }
        let loss: &dyn DifferentiableMetric =
            self.loss_metric.as_differentiable().ok_or_else(|| {
                GpError::NonDifferentiableMetric(self.loss_metric.name().to_string())
            })?;

        let mut rng = make_rng(self.gp.seed);
        let base = loss.init_base(train.y(), train.weights());
        let mut ensemble = Ensemble::new(base);
        let mut train_preds = vec![base; train.n_rows()];
        let mut val_preds = val.map(|v| vec![base; v.n_rows()]);
        let mut early_stopping = EarlyStopping::new(
            self.boosting.n_early_stopping_rounds,
            self.eval_metric.bigger_is_better(),
        );
        let mut history = Vec::new();

        let n_rounds = self.boosting.n_rounds;
        for round in 1..=n_rounds {
            let rows = sample_indices(train.n_rows(), self.boosting.row_sampling, &mut rng);
            let cols = sample_indices(train.n_features(), self.boosting.col_sampling, &mut rng);

            let gradient = loss.gradient(train.y(), &train_preds);
            let residuals: Vec<f64> = rows.iter().map(|&i| -gradient[i]).collect();
            let round_train = train.subset(&rows, &cols)?.with_target(residuals)?;

            let round_config = GpConfig {
                loss_metric: "mse".to_string(),
                eval_metric: None,
                verbose: false,
                seed: rng.gen_range(1..=u64::MAX),
                ..self.gp.clone()
            };
            let mut estimator = GpEstimator::new(round_config)?;
            let mut program = estimator.fit(&round_train, None)?;
            program.remap_features(&cols);

            let h = program.evaluate(train);
            if h.iter().any(|v| !v.is_finite()) {
                warn!("round {}: learner {} is not finite on training data, skipped", round, program);
                continue;
            }

            let multiplier = if self.boosting.line_search {
                step_multiplier(|m| {
                    let shifted: Vec<f64> = train_preds
                        .iter()
                        .zip(&h)
                        .map(|(p, hi)| p + m * hi)
                        .collect();
                    loss.loss(train.y(), &shifted, train.weights())
                })
            } else {
                1.0
            };
            let step = multiplier * self.boosting.learning_rate;

            for (p, hi) in train_preds.iter_mut().zip(&h) {
                *p += step * hi;
            }
            if let (Some(val), Some(preds)) = (val, val_preds.as_mut()) {
                let hv = program.predict(val)?;
                for (p, hi) in preds.iter_mut().zip(&hv) {
                    *p += step * hi;
                }
            }
            ensemble.push(program, step);

            let train_loss = self
                .loss_metric
                .score(train.y(), &train_preds, train.weights());
            let mut val_score = None;
            let mut stop = false;
            if round % self.boosting.monitor_every == 0 || round == n_rounds {
                if let (Some(val), Some(preds)) = (val, val_preds.as_ref()) {
                    let score = self.eval_metric.score(val.y(), preds, val.weights());
                    val_score = Some(score);
                    stop = early_stopping.should_stop(score, ensemble.n_learners());
                }
            }

            if self.gp.verbose {
                match val_score {
                    Some(score) => info!(
                        "round {}: step {:.4}, train {} {:.6}, val {} {:.6}",
                        round,
                        step,
                        self.loss_metric.name(),
                        train_loss,
                        self.eval_metric.name(),
                        score
                    ),
                    None => info!(
                        "round {}: step {:.4}, train {} {:.6}",
                        round,
                        step,
                        self.loss_metric.name(),
                        train_loss
                    ),
                }
            }

            history.push(RoundStats {
                round,
                step,
                train_loss,
                val_score,
                n_learners: ensemble.n_learners(),
            });

            if stop {
                if self.gp.verbose {
                    info!(
                        "early stopping at round {}, best {} {:.6} with {} learners",
                        round,
                        self.eval_metric.name(),
                        early_stopping.best_value().unwrap_or(f64::NAN),
                        early_stopping.best_n_learners()
                    );
                }
                break;
            }
        }

        if self.boosting.use_best_rounds && early_stopping.best_value().is_some() {
            ensemble.truncate(early_stopping.best_n_learners());
        }

        self.history = history;
        Ok(self.ensemble.insert(ensemble))
    }
}
