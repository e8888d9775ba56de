//! Regression metrics.

use super::{mean_of, weighted_mean, DifferentiableMetric, Metric};

/// Mean absolute error
#[derive(Debug, Clone, Copy, Default)]
pub struct Mae;

impl Metric for Mae {
    fn name(&self) -> &'static str {
        "mae"
    }

    fn score(&self, y_true: &[f64], y_pred: &[f64], weights: Option<&[f64]>) -> f64 {
        mean_of(y_true, y_pred, weights, |t, p| (t - p).abs())
    }

    fn as_differentiable(&self) -> Option<&dyn DifferentiableMetric> {
        Some(self)
    }
}

impl DifferentiableMetric for Mae {
    /// Sub-gradient: sign(pred - target), 0 on exact hits
    fn gradient(&self, y_true: &[f64], y_pred: &[f64]) -> Vec<f64> {
        y_true
            .iter()
            .zip(y_pred)
            .map(|(&t, &p)| {
                if p > t {
                    1.0
                } else if p < t {
                    -1.0
                } else {
                    0.0
                }
            })
            .collect()
    }
}

/// Mean squared error
#[derive(Debug, Clone, Copy, Default)]
pub struct Mse;

impl Metric for Mse {
    fn name(&self) -> &'static str {
        "mse"
    }

    fn score(&self, y_true: &[f64], y_pred: &[f64], weights: Option<&[f64]>) -> f64 {
        mean_of(y_true, y_pred, weights, |t, p| (t - p).powi(2))
    }

    fn as_differentiable(&self) -> Option<&dyn DifferentiableMetric> {
        Some(self)
    }
}

impl DifferentiableMetric for Mse {
    fn gradient(&self, y_true: &[f64], y_pred: &[f64]) -> Vec<f64> {
        y_true
            .iter()
            .zip(y_pred)
            .map(|(&t, &p)| 2.0 * (p - t))
            .collect()
    }
}

/// Root mean squared error
#[derive(Debug, Clone, Copy, Default)]
pub struct Rmse;

impl Metric for Rmse {
    fn name(&self) -> &'static str {
        "rmse"
    }

    fn score(&self, y_true: &[f64], y_pred: &[f64], weights: Option<&[f64]>) -> f64 {
        Mse.score(y_true, y_pred, weights).sqrt()
    }
}

/// Coefficient of determination
#[derive(Debug, Clone, Copy, Default)]
pub struct R2;

impl Metric for R2 {
    fn name(&self) -> &'static str {
        "r2"
    }

    fn score(&self, y_true: &[f64], y_pred: &[f64], weights: Option<&[f64]>) -> f64 {
        let mean = weighted_mean(y_true, weights);
        let ss_res = mean_of(y_true, y_pred, weights, |t, p| (t - p).powi(2));
        let ss_tot = mean_of(y_true, y_true, weights, |t, _| (t - mean).powi(2));
        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }
        1.0 - ss_res / ss_tot
    }

    fn bigger_is_better(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const Y: [f64; 4] = [1.0, 2.0, 3.0, 4.0];
    const P: [f64; 4] = [1.5, 2.0, 2.0, 5.0];

    #[test]
    fn test_mae() {
        assert_relative_eq!(Mae.score(&Y, &P, None), 2.5 / 4.0);
        assert_relative_eq!(
            Mae.score(&Y, &P, Some(&[1.0, 0.0, 0.0, 1.0])),
            1.5 / 2.0
        );
    }

    #[test]
    fn test_mae_gradient() {
        assert_eq!(Mae.gradient(&Y, &P), vec![1.0, 0.0, -1.0, 1.0]);
    }

    #[test]
    fn test_mse_and_rmse() {
        let mse = (0.25 + 0.0 + 1.0 + 1.0) / 4.0;
        assert_relative_eq!(Mse.score(&Y, &P, None), mse);
        assert_relative_eq!(Rmse.score(&Y, &P, None), mse.sqrt());
    }

    #[test]
    fn test_mse_gradient() {
        assert_eq!(Mse.gradient(&Y, &P), vec![1.0, 0.0, -2.0, 2.0]);
    }

    #[test]
    fn test_r2() {
        assert_relative_eq!(R2.score(&Y, &Y, None), 1.0);
        // Predicting the mean everywhere scores zero
        assert_relative_eq!(R2.score(&Y, &[2.5; 4], None), 0.0);
        assert!(R2.bigger_is_better());
    }

    #[test]
    fn test_nan_prediction_propagates() {
        assert!(Mae.score(&Y, &[f64::NAN, 2.0, 3.0, 4.0], None).is_nan());
    }
}
