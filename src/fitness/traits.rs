//! Fitness traits
//!
//! Fitness is minimised throughout the crate: lower is better and
//! `f64::INFINITY` marks a program that could not be scored.

use serde::{Deserialize, Serialize};

use crate::program::Program;

/// Outcome of evaluating one program
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Loss plus the parsimony penalty
    pub fitness: f64,
    /// Raw loss on the training data
    pub loss: f64,
}

impl Evaluation {
    /// Evaluation of a program that produced non-finite output
    pub fn unfit() -> Self {
        Self {
            fitness: f64::INFINITY,
            loss: f64::INFINITY,
        }
    }

    /// Check if the fitness is finite
    pub fn is_fit(&self) -> bool {
        self.fitness.is_finite()
    }
}

/// Fitness evaluation trait
///
/// Evaluation must be deterministic and consume no randomness, so that
/// populations can be evaluated in any order or in parallel.
pub trait Fitness: Send + Sync {
    /// Score a program
    fn evaluate(&self, program: &Program) -> Evaluation;
}
