//! Early stopping on a validation metric
//!
//! Tracks the best validation score seen at each monitoring checkpoint and
//! signals when `patience` consecutive checkpoints fail to improve on it.

/// Early stopping state
#[derive(Clone, Debug)]
pub struct EarlyStopping {
    /// Checkpoints without improvement before stopping; 0 never stops
    patience: usize,
    best_value: Option<f64>,
    /// Ensemble length at the best checkpoint
    best_n_learners: usize,
    /// Checkpoints since the best one
    since_best: usize,
    higher_is_better: bool,
}

impl EarlyStopping {
    /// Create a new early stopping tracker
    pub fn new(patience: usize, higher_is_better: bool) -> Self {
        Self {
            patience,
            best_value: None,
            best_n_learners: 0,
            since_best: 0,
            higher_is_better,
        }
    }

    /// Record a checkpoint and check whether training should stop
    ///
    /// A non-finite value never counts as an improvement.
    pub fn should_stop(&mut self, value: f64, n_learners: usize) -> bool {
        let is_improvement = value.is_finite()
            && match self.best_value {
                None => true,
                Some(best) => {
                    if self.higher_is_better {
                        value > best
                    } else {
                        value < best
                    }
                }
            };

        if is_improvement {
            self.best_value = Some(value);
            self.best_n_learners = n_learners;
            self.since_best = 0;
        } else {
            self.since_best += 1;
        }

        self.patience > 0 && self.since_best >= self.patience
    }

    /// Best value seen
    pub fn best_value(&self) -> Option<f64> {
        self.best_value
    }

    /// Ensemble length at the best checkpoint
    pub fn best_n_learners(&self) -> usize {
        self.best_n_learners
    }
}
