//! Individual wrapper type
//!
//! This module provides the Individual type that wraps a program with its
//! cached evaluation.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::fitness::traits::Evaluation;
use crate::program::Program;

/// An individual in the population
///
/// Wraps a program with its fitness and loss. Both are `None` until the
/// individual is evaluated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    /// The program of this individual
    program: Program,
    /// Fitness (loss plus parsimony penalty)
    pub fitness: Option<f64>,
    /// Raw loss
    pub loss: Option<f64>,
    /// Generation when this individual was created
    pub birth_generation: usize,
}

impl Individual {
    /// Create a new, unevaluated individual
    pub fn new(program: Program) -> Self {
        Self {
            program,
            fitness: None,
            loss: None,
            birth_generation: 0,
        }
    }

    /// Create a new individual with birth generation
    pub fn with_generation(program: Program, generation: usize) -> Self {
        Self {
            birth_generation: generation,
            ..Self::new(program)
        }
    }

    /// Check if this individual has been evaluated
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Fitness, or infinity if not evaluated
    pub fn fitness_or_worst(&self) -> f64 {
        self.fitness.unwrap_or(f64::INFINITY)
    }

    /// Store an evaluation
    pub fn set_evaluation(&mut self, evaluation: Evaluation) {
        self.fitness = Some(evaluation.fitness);
        self.loss = Some(evaluation.loss);
    }

    /// Get a reference to the program
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Order by fitness, then by size; `Less` means `self` is better
    ///
    /// Unevaluated individuals rank last.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.fitness_or_worst()
            .total_cmp(&other.fitness_or_worst())
            .then_with(|| self.program.size().cmp(&other.program.size()))
    }

    /// Check if this individual is strictly better than another
    pub fn is_better_than(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Less
    }
}
