//! Loss-based fitness with a parsimony penalty

use super::traits::{Evaluation, Fitness};
use crate::dataset::Dataset;
use crate::metrics::Metric;
use crate::program::Program;

/// Scores programs as `loss + parsimony_coeff * size` on a training set
#[derive(Debug)]
pub struct LossFitness<'a> {
    dataset: &'a Dataset,
    metric: &'a dyn Metric,
    parsimony_coeff: f64,
}

impl<'a> LossFitness<'a> {
    /// Create an evaluator over `dataset`
    pub fn new(dataset: &'a Dataset, metric: &'a dyn Metric, parsimony_coeff: f64) -> Self {
        Self {
            dataset,
            metric,
            parsimony_coeff,
        }
    }

    /// Training data
    pub fn dataset(&self) -> &Dataset {
        self.dataset
    }

    /// Loss metric
    pub fn metric(&self) -> &dyn Metric {
        self.metric
    }
}

impl Fitness for LossFitness<'_> {
    fn evaluate(&self, program: &Program) -> Evaluation {
        let y_pred = program.evaluate(self.dataset);
        if y_pred.iter().any(|p| !p.is_finite()) {
            return Evaluation::unfit();
        }
        let loss = self
            .metric
            .loss(self.dataset.y(), &y_pred, self.dataset.weights());
        if !loss.is_finite() {
            return Evaluation::unfit();
        }
        Evaluation {
            fitness: loss + self.parsimony_coeff * program.size() as f64,
            loss,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Mae, R2};
    use approx::assert_relative_eq;

    fn dataset() -> Dataset {
        Dataset::from_rows(
            &[vec![1.0], vec![2.0], vec![3.0]],
            vec![2.0, 4.0, 6.0],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_parsimony_penalty() {
        let ds = dataset();
        let fitness = LossFitness::new(&ds, &Mae, 0.5);
        let program: Program = "mul(x0, 2.0)".parse().unwrap();
        let eval = fitness.evaluate(&program);
        assert_relative_eq!(eval.loss, 0.0);
        assert_relative_eq!(eval.fitness, 1.5);
    }

    #[test]
    fn test_bigger_is_better_metric_is_negated() {
        let ds = dataset();
        let fitness = LossFitness::new(&ds, &R2, 0.0);
        let program: Program = "mul(x0, 2.0)".parse().unwrap();
        assert_relative_eq!(fitness.evaluate(&program).fitness, -1.0);
    }

    #[test]
    fn test_non_finite_output_is_unfit() {
        let ds = dataset();
        let fitness = LossFitness::new(&ds, &Mae, 0.0);
        let program: Program = "log(sub(x0, 2.0))".parse().unwrap();
        assert_eq!(fitness.evaluate(&program), Evaluation::unfit());
    }
}
