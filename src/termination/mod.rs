//! Termination criteria
//!
//! This module provides the stopping rules consulted after every generation.

/// Evolution state for termination checking
#[derive(Clone, Debug)]
pub struct EvolutionState<'a> {
    /// Number of completed generations
    pub generation: usize,
    /// Best-so-far fitness after each generation, starting with the initial population
    pub fitness_history: &'a [f64],
}

/// Termination criterion trait
pub trait TerminationCriterion: Send + Sync {
    /// Check if evolution should terminate
    fn should_terminate(&self, state: &EvolutionState) -> bool;

    /// Get a description of why termination occurred
    fn reason(&self) -> &'static str;
}

/// Terminate after a maximum number of generations
#[derive(Clone, Debug)]
pub struct MaxGenerations(pub usize);

impl MaxGenerations {
    /// Create a new max generations criterion
    pub fn new(max: usize) -> Self {
        Self(max)
    }
}

impl TerminationCriterion for MaxGenerations {
    fn should_terminate(&self, state: &EvolutionState) -> bool {
        state.generation >= self.0
    }

    fn reason(&self) -> &'static str {
        "Maximum generations reached"
    }
}

/// Terminate when the best fitness stops improving
///
/// Triggers once the best-so-far fitness has improved by no more than
/// `epsilon` over the last `generations` generations.
#[derive(Clone, Debug)]
pub struct FitnessStagnation {
    /// Number of generations to look back
    pub generations: usize,
    /// Minimum improvement threshold
    pub epsilon: f64,
}

impl FitnessStagnation {
    /// Create a new fitness stagnation criterion
    pub fn new(generations: usize, epsilon: f64) -> Self {
        Self {
            generations,
            epsilon,
        }
    }
}

impl TerminationCriterion for FitnessStagnation {
    fn should_terminate(&self, state: &EvolutionState) -> bool {
        let history = state.fitness_history;
        if self.generations == 0 || history.len() <= self.generations {
            return false;
        }

        let first = history[history.len() - 1 - self.generations];
        let last = history[history.len() - 1];
        // Two infinite values give NaN, which also counts as no improvement
        let improvement = first - last;
        !(improvement > self.epsilon)
    }

    fn reason(&self) -> &'static str {
        "Fitness stagnation detected"
    }
}

/// Combine criteria with OR logic (any one triggers termination)
pub struct AnyOf {
    criteria: Vec<Box<dyn TerminationCriterion>>,
}

impl AnyOf {
    /// Create a new AnyOf combinator
    pub fn new(criteria: Vec<Box<dyn TerminationCriterion>>) -> Self {
        Self { criteria }
    }

    /// Reason of the first criterion that triggers, if any
    pub fn triggered(&self, state: &EvolutionState) -> Option<&'static str> {
        self.criteria
            .iter()
            .find(|c| c.should_terminate(state))
            .map(|c| c.reason())
    }
}

pub mod prelude {
    pub use super::{AnyOf, EvolutionState, FitnessStagnation, MaxGenerations, TerminationCriterion};
}
