//! Operator traits
//!
//! This module defines the operator traits and the height-bounded wrappers
//! used to apply structural operators.

use rand::Rng;

use crate::error::{OperatorError, OperatorResult};
use crate::population::individual::Individual;
use crate::program::Program;

/// Number of attempts before a bounded operator gives up
pub const MAX_RETRIES: usize = 8;

/// Selection operator trait
///
/// Selects individuals from a population for reproduction.
pub trait SelectionOperator: Send + Sync {
    /// Select a single individual from the population
    ///
    /// Returns the index of the selected individual.
    fn select<R: Rng>(&self, population: &[Individual], rng: &mut R) -> usize;

    /// Select multiple individuals from the population
    fn select_many<R: Rng>(
        &self,
        population: &[Individual],
        count: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        (0..count).map(|_| self.select(population, rng)).collect()
    }
}

/// Crossover operator trait
///
/// Combines genetic material from two parents into one offspring.
pub trait CrossoverOperator: Send + Sync {
    /// Graft material from `donor` into a copy of `recipient`
    fn crossover<R: Rng>(&self, recipient: &Program, donor: &Program, rng: &mut R) -> Program;
}

/// Mutation operator trait
///
/// Produces a randomly modified copy of a program.
pub trait MutationOperator: Send + Sync {
    /// Apply mutation to a copy of `program`
    fn mutate<R: Rng>(&self, program: &Program, rng: &mut R) -> Program;
}

/// Inclusive bounds on program height
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeightBounds {
    /// Minimum height
    pub min: usize,
    /// Maximum height
    pub max: usize,
}

impl HeightBounds {
    /// Create bounds `min..=max`
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Check if a program satisfies the bounds
    pub fn contains(&self, program: &Program) -> bool {
        (self.min..=self.max).contains(&program.height())
    }
}

/// Mutate until the result satisfies `bounds`, up to [`MAX_RETRIES`] attempts
pub fn mutate_bounded<M, R>(
    operator: &M,
    program: &Program,
    bounds: HeightBounds,
    rng: &mut R,
) -> OperatorResult<Program>
where
    M: MutationOperator,
    R: Rng,
{
    for _ in 0..MAX_RETRIES {
        let child = operator.mutate(program, rng);
        if bounds.contains(&child) {
            return OperatorResult::Success(child);
        }
    }
    OperatorResult::Failed(OperatorError::MutationFailed(format!(
        "no offspring within heights {}..={} after {} attempts",
        bounds.min, bounds.max, MAX_RETRIES
    )))
}

/// Cross over until the result satisfies `bounds`, up to [`MAX_RETRIES`] attempts
pub fn crossover_bounded<C, R>(
    operator: &C,
    recipient: &Program,
    donor: &Program,
    bounds: HeightBounds,
    rng: &mut R,
) -> OperatorResult<Program>
where
    C: CrossoverOperator,
    R: Rng,
{
    for _ in 0..MAX_RETRIES {
        let child = operator.crossover(recipient, donor, rng);
        if bounds.contains(&child) {
            return OperatorResult::Success(child);
        }
    }
    OperatorResult::Failed(OperatorError::CrossoverFailed(format!(
        "no offspring within heights {}..={} after {} attempts",
        bounds.min, bounds.max, MAX_RETRIES
    )))
}
