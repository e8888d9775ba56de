//! Evaluation metrics
//!
//! Every metric can score predictions against targets. Metrics that also
//! expose a gradient with respect to the predictions implement
//! [`DifferentiableMetric`]; boosting only accepts those, and checks for the
//! capability through [`Metric::as_differentiable`].
//!
//! # Available Metrics
//!
//! ## Regression
//! - [`Mae`] (differentiable), [`Mse`] (differentiable), [`Rmse`], [`R2`]
//!
//! ## Binary classification
//! Predictions are raw program outputs, read as log-odds.
//! - [`LogLoss`] (differentiable), [`Accuracy`], [`Precision`], [`Recall`],
//!   [`F1`], [`RocAuc`]

mod classification;
mod regression;

use std::fmt::Debug;

pub use classification::{sigmoid, Accuracy, F1, LogLoss, Precision, Recall, RocAuc};
pub use regression::{Mae, Mse, Rmse, R2};

use crate::error::{GpError, GpResult};

/// A metric scoring predictions against targets
pub trait Metric: Send + Sync + Debug {
    /// Name used in configuration and logs
    fn name(&self) -> &'static str;

    /// Score predictions, optionally weighting each row
    fn score(&self, y_true: &[f64], y_pred: &[f64], weights: Option<&[f64]>) -> f64;

    /// Whether higher scores are better
    fn bigger_is_better(&self) -> bool {
        false
    }

    /// Score oriented for minimisation
    fn loss(&self, y_true: &[f64], y_pred: &[f64], weights: Option<&[f64]>) -> f64 {
        let score = self.score(y_true, y_pred, weights);
        if self.bigger_is_better() {
            -score
        } else {
            score
        }
    }

    /// Gradient capability, if this metric has one
    fn as_differentiable(&self) -> Option<&dyn DifferentiableMetric> {
        None
    }
}

/// A metric with a gradient with respect to the predictions
pub trait DifferentiableMetric: Metric {
    /// Per-row derivative of the loss with respect to each prediction
    fn gradient(&self, y_true: &[f64], y_pred: &[f64]) -> Vec<f64>;

    /// Constant prediction that an ensemble starts from
    fn init_base(&self, y_true: &[f64], weights: Option<&[f64]>) -> f64 {
        weighted_mean(y_true, weights)
    }
}

/// Look up a metric by its configuration name
pub fn metric_from_name(name: &str) -> GpResult<Box<dyn Metric>> {
    let metric: Box<dyn Metric> = match name.trim().to_lowercase().as_str() {
        "mae" => Box::new(Mae),
        "mse" => Box::new(Mse),
        "rmse" => Box::new(Rmse),
        "r2" => Box::new(R2),
        "logloss" | "log_loss" => Box::new(LogLoss),
        "accuracy" => Box::new(Accuracy),
        "precision" => Box::new(Precision),
        "recall" => Box::new(Recall),
        "f1" => Box::new(F1),
        "roc_auc" | "auc" => Box::new(RocAuc),
        _ => return Err(GpError::UnknownMetric(name.to_string())),
    };
    Ok(metric)
}

/// Weighted arithmetic mean; plain mean without weights
pub(crate) fn weighted_mean(values: &[f64], weights: Option<&[f64]>) -> f64 {
    match weights {
        Some(w) => {
            let total: f64 = w.iter().sum();
            if total <= 0.0 {
                return 0.0;
            }
            values.iter().zip(w).map(|(v, wi)| v * wi).sum::<f64>() / total
        }
        None => {
            if values.is_empty() {
                return 0.0;
            }
            values.iter().sum::<f64>() / values.len() as f64
        }
    }
}

/// Weighted mean of a per-row quantity
pub(crate) fn mean_of<F>(y_true: &[f64], y_pred: &[f64], weights: Option<&[f64]>, f: F) -> f64
where
    F: Fn(f64, f64) -> f64,
{
    let values: Vec<f64> = y_true.iter().zip(y_pred).map(|(&t, &p)| f(t, p)).collect();
    weighted_mean(&values, weights)
}
