//! Population type
//!
//! This module provides the Population container type.

use rand::Rng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::fitness::traits::Fitness;
use crate::population::individual::Individual;
use crate::program::{Program, TreeGenerator};

/// A population of individuals
#[derive(Clone, Debug, Default)]
pub struct Population {
    /// The individuals in this population
    individuals: Vec<Individual>,
    /// Current generation number
    generation: usize,
}

impl Population {
    /// Create an empty population
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a population from a vector of individuals
    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self {
            individuals,
            generation: 0,
        }
    }

    /// Create a random population with ramped half-and-half
    pub fn random<R: Rng>(size: usize, generator: &TreeGenerator, rng: &mut R) -> Self {
        let individuals = (0..size)
            .map(|_| Individual::new(Program::new(generator.generate(rng))))
            .collect();
        Self::from_individuals(individuals)
    }

    /// Get the current generation
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Increment the generation counter
    pub fn increment_generation(&mut self) {
        self.generation += 1;
    }

    /// Get the population size
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Check if the population is empty
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Get an iterator over the individuals
    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.iter()
    }

    /// Get the underlying vector of individuals
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Replace every individual, keeping the generation counter
    pub fn replace(&mut self, individuals: Vec<Individual>) {
        self.individuals = individuals;
    }

    /// Take the individuals out of this population
    pub fn into_individuals(self) -> Vec<Individual> {
        self.individuals
    }

    /// Get the best individual (lowest fitness, smallest program on ties)
    pub fn best(&self) -> Option<&Individual> {
        self.individuals
            .iter()
            .filter(|i| i.is_evaluated())
            .min_by(|a, b| a.compare(b))
    }

    /// Check whether every individual has been evaluated
    pub fn all_evaluated(&self) -> bool {
        self.individuals.iter().all(|i| i.is_evaluated())
    }

    /// Number of evaluated individuals with non-finite fitness
    pub fn count_unfit(&self) -> usize {
        self.individuals
            .iter()
            .filter(|i| i.fitness.is_some_and(|f| !f.is_finite()))
            .count()
    }

    /// Evaluate individuals lacking a cached fitness (sequential)
    ///
    /// Returns the number of evaluations performed.
    pub fn evaluate<Fit: Fitness>(&mut self, fitness: &Fit) -> usize {
        let mut count = 0;
        for individual in &mut self.individuals {
            if !individual.is_evaluated() {
                let eval = fitness.evaluate(individual.program());
                individual.set_evaluation(eval);
                count += 1;
            }
        }
        count
    }

    /// Mean program size
    pub fn mean_size(&self) -> f64 {
        if self.individuals.is_empty() {
            return 0.0;
        }
        self.individuals
            .iter()
            .map(|i| i.program().size() as f64)
            .sum::<f64>()
            / self.individuals.len() as f64
    }
}

/// Parallel evaluation support (requires `parallel` feature)
#[cfg(feature = "parallel")]
impl Population {
    /// Evaluate individuals lacking a cached fitness (parallel)
    ///
    /// Returns the number of evaluations performed.
    pub fn evaluate_parallel<Fit: Fitness>(&mut self, fitness: &Fit) -> usize {
        self.individuals
            .par_iter_mut()
            .filter(|i| !i.is_evaluated())
            .map(|individual| {
                let eval = fitness.evaluate(individual.program());
                individual.set_evaluation(eval);
                1usize
            })
            .sum()
    }
}

/// Sequential fallback for parallel evaluation (when `parallel` feature is disabled)
#[cfg(not(feature = "parallel"))]
impl Population {
    /// Evaluate individuals lacking a cached fitness (sequential fallback)
    pub fn evaluate_parallel<Fit: Fitness>(&mut self, fitness: &Fit) -> usize {
        self.evaluate(fitness)
    }
}

impl FromIterator<Individual> for Population {
    fn from_iter<I: IntoIterator<Item = Individual>>(iter: I) -> Self {
        Self::from_individuals(iter.into_iter().collect())
    }
}
