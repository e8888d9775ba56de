//! Binary classification metrics.
//!
//! Raw program outputs are read as log-odds: a row is predicted positive
//! when its output is above zero (probability above one half).

use super::{mean_of, DifferentiableMetric, Metric};

const EPS: f64 = 1e-15;

/// Logistic function
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn is_positive(raw: f64) -> bool {
    raw > 0.0
}

/// Weighted confusion counts: (true pos, false pos, false neg, true neg)
fn confusion(y_true: &[f64], y_pred: &[f64], weights: Option<&[f64]>) -> (f64, f64, f64, f64) {
    let mut counts = (0.0, 0.0, 0.0, 0.0);
    for (i, (&t, &p)) in y_true.iter().zip(y_pred).enumerate() {
        let w = weights.map_or(1.0, |w| w[i]);
        match (t > 0.5, is_positive(p)) {
            (true, true) => counts.0 += w,
            (false, true) => counts.1 += w,
            (true, false) => counts.2 += w,
            (false, false) => counts.3 += w,
        }
    }
    counts
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Binary cross-entropy on the sigmoid of the raw output
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLoss;

impl Metric for LogLoss {
    fn name(&self) -> &'static str {
        "logloss"
    }

    fn score(&self, y_true: &[f64], y_pred: &[f64], weights: Option<&[f64]>) -> f64 {
        mean_of(y_true, y_pred, weights, |t, raw| {
            let p = sigmoid(raw).clamp(EPS, 1.0 - EPS);
            -(t * p.ln() + (1.0 - t) * (1.0 - p).ln())
        })
    }

    fn as_differentiable(&self) -> Option<&dyn DifferentiableMetric> {
        Some(self)
    }
}

impl DifferentiableMetric for LogLoss {
    fn gradient(&self, y_true: &[f64], y_pred: &[f64]) -> Vec<f64> {
        y_true
            .iter()
            .zip(y_pred)
            .map(|(&t, &raw)| sigmoid(raw) - t)
            .collect()
    }

    /// Log-odds of the weighted positive rate
    fn init_base(&self, y_true: &[f64], weights: Option<&[f64]>) -> f64 {
        let p = super::weighted_mean(y_true, weights).clamp(EPS, 1.0 - EPS);
        (p / (1.0 - p)).ln()
    }
}

/// Fraction of correctly classified rows
#[derive(Debug, Clone, Copy, Default)]
pub struct Accuracy;

impl Metric for Accuracy {
    fn name(&self) -> &'static str {
        "accuracy"
    }

    fn score(&self, y_true: &[f64], y_pred: &[f64], weights: Option<&[f64]>) -> f64 {
        let (tp, fp, fn_, tn) = confusion(y_true, y_pred, weights);
        ratio(tp + tn, tp + fp + fn_ + tn)
    }

    fn bigger_is_better(&self) -> bool {
        true
    }
}

/// Precision of the positive class
#[derive(Debug, Clone, Copy, Default)]
pub struct Precision;

impl Metric for Precision {
    fn name(&self) -> &'static str {
        "precision"
    }

    fn score(&self, y_true: &[f64], y_pred: &[f64], weights: Option<&[f64]>) -> f64 {
        let (tp, fp, _, _) = confusion(y_true, y_pred, weights);
        ratio(tp, tp + fp)
    }

    fn bigger_is_better(&self) -> bool {
        true
    }
}

/// Recall of the positive class
#[derive(Debug, Clone, Copy, Default)]
pub struct Recall;

impl Metric for Recall {
    fn name(&self) -> &'static str {
        "recall"
    }

    fn score(&self, y_true: &[f64], y_pred: &[f64], weights: Option<&[f64]>) -> f64 {
        let (tp, _, fn_, _) = confusion(y_true, y_pred, weights);
        ratio(tp, tp + fn_)
    }

    fn bigger_is_better(&self) -> bool {
        true
    }
}

/// Harmonic mean of precision and recall
#[derive(Debug, Clone, Copy, Default)]
pub struct F1;

impl Metric for F1 {
    fn name(&self) -> &'static str {
        "f1"
    }

    fn score(&self, y_true: &[f64], y_pred: &[f64], weights: Option<&[f64]>) -> f64 {
        let (tp, fp, fn_, _) = confusion(y_true, y_pred, weights);
        ratio(2.0 * tp, 2.0 * tp + fp + fn_)
    }

    fn bigger_is_better(&self) -> bool {
        true
    }
}

/// Area under the ROC curve (weighted Mann-Whitney statistic)
#[derive(Debug, Clone, Copy, Default)]
pub struct RocAuc;

impl Metric for RocAuc {
    fn name(&self) -> &'static str {
        "roc_auc"
    }

    fn score(&self, y_true: &[f64], y_pred: &[f64], weights: Option<&[f64]>) -> f64 {
        if y_pred.iter().any(|p| p.is_nan()) {
            return f64::NAN;
        }
        let mut order: Vec<usize> = (0..y_true.len()).collect();
        order.sort_by(|&a, &b| y_pred[a].total_cmp(&y_pred[b]));

        let weight = |i: usize| weights.map_or(1.0, |w| w[i]);
        let mut neg_below = 0.0;
        let mut area = 0.0;
        let mut total_pos = 0.0;
        let mut i = 0;
        while i < order.len() {
            // Rows sharing a score form one tie group
            let mut j = i;
            let (mut pos, mut neg) = (0.0, 0.0);
            while j < order.len() && y_pred[order[j]] == y_pred[order[i]] {
                let row = order[j];
                if y_true[row] > 0.5 {
                    pos += weight(row);
                } else {
                    neg += weight(row);
                }
                j += 1;
            }
            area += pos * (neg_below + 0.5 * neg);
            neg_below += neg;
            total_pos += pos;
            i = j;
        }
        ratio(area, total_pos * neg_below)
    }

    fn bigger_is_better(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const Y: [f64; 4] = [1.0, 0.0, 1.0, 0.0];

    #[test]
    fn test_sigmoid() {
        assert_relative_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(40.0) > 0.999);
        assert!(sigmoid(-40.0) < 0.001);
    }

    #[test]
    fn test_logloss_at_zero_is_ln2() {
        assert_relative_eq!(LogLoss.score(&Y, &[0.0; 4], None), 2f64.ln());
    }

    #[test]
    fn test_logloss_gradient_and_base() {
        assert_eq!(LogLoss.gradient(&Y, &[0.0; 4]), vec![-0.5, 0.5, -0.5, 0.5]);
        assert_relative_eq!(LogLoss.init_base(&Y, None), 0.0);
        assert!(LogLoss.init_base(&[1.0, 1.0, 1.0, 0.0], None) > 0.0);
    }

    #[test]
    fn test_confusion_based_metrics() {
        // Predicted classes: 1, 1, 0, 0
        let raw = [2.0, 0.5, -1.0, -3.0];
        assert_relative_eq!(Accuracy.score(&Y, &raw, None), 0.5);
        assert_relative_eq!(Precision.score(&Y, &raw, None), 0.5);
        assert_relative_eq!(Recall.score(&Y, &raw, None), 0.5);
        assert_relative_eq!(F1.score(&Y, &raw, None), 0.5);
    }

    #[test]
    fn test_roc_auc() {
        assert_relative_eq!(RocAuc.score(&Y, &[0.9, 0.1, 0.8, 0.2], None), 1.0);
        assert_relative_eq!(RocAuc.score(&Y, &[0.1, 0.9, 0.2, 0.8], None), 0.0);
        assert_relative_eq!(RocAuc.score(&Y, &[0.5; 4], None), 0.5);
    }
}
