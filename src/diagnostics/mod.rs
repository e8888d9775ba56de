//! Diagnostics and statistics
//!
//! This module provides statistics collection for GP runs and boosting
//! rounds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::population::individual::Individual;

/// Statistics for a single generation, across every island
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number (0 is the initial population)
    pub generation: usize,
    /// Total fitness evaluations so far
    pub evaluations: usize,
    /// Best fitness in this generation
    pub best_fitness: f64,
    /// Loss of the best individual in this generation
    pub best_loss: f64,
    /// Mean fitness over individuals with finite fitness
    pub mean_fitness: f64,
    /// Median fitness over individuals with finite fitness
    pub median_fitness: f64,
    /// Mean program size
    pub mean_size: f64,
    /// Individuals with non-finite fitness
    pub unfit: usize,
    /// Eval metric of the best-so-far program on validation data
    pub val_score: Option<f64>,
    /// Wall-clock time of the generation (ms)
    pub elapsed_ms: f64,
}

impl GenerationStats {
    /// Compute statistics from evaluated individuals
    pub fn from_individuals<'a, I>(individuals: I, generation: usize, evaluations: usize) -> Self
    where
        I: IntoIterator<Item = &'a Individual>,
    {
        let mut best: Option<&Individual> = None;
        let mut finite = Vec::new();
        let mut total_size = 0usize;
        let mut count = 0usize;
        let mut unfit = 0usize;

        for ind in individuals {
            count += 1;
            total_size += ind.program().size();
            match ind.fitness {
                Some(f) if f.is_finite() => finite.push(f),
                _ => unfit += 1,
            }
            if best.map_or(true, |b| ind.is_better_than(b)) {
                best = Some(ind);
            }
        }

        finite.sort_by(|a, b| a.total_cmp(b));
        let mean = if finite.is_empty() {
            f64::INFINITY
        } else {
            finite.iter().sum::<f64>() / finite.len() as f64
        };
        let median = match finite.len() {
            0 => f64::INFINITY,
            n if n % 2 == 0 => (finite[n / 2 - 1] + finite[n / 2]) / 2.0,
            n => finite[n / 2],
        };

        Self {
            generation,
            evaluations,
            best_fitness: best.map_or(f64::INFINITY, |b| b.fitness_or_worst()),
            best_loss: best.and_then(|b| b.loss).unwrap_or(f64::INFINITY),
            mean_fitness: mean,
            median_fitness: median,
            mean_size: if count == 0 {
                0.0
            } else {
                total_size as f64 / count as f64
            },
            unfit,
            val_score: None,
            elapsed_ms: 0.0,
        }
    }

    /// Set the validation score
    pub fn with_val_score(mut self, score: Option<f64>) -> Self {
        self.val_score = score;
        self
    }

    /// Set the elapsed time
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        self
    }
}

/// Statistics collector for an entire GP run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Statistics per generation
    pub generations: Vec<GenerationStats>,
    /// Total runtime in milliseconds
    pub total_runtime_ms: f64,
    /// Reason for termination
    pub termination_reason: Option<String>,
}

impl EvolutionStats {
    /// Create a new stats collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a generation's statistics
    pub fn record(&mut self, stats: GenerationStats) {
        self.generations.push(stats);
    }

    /// Get the number of generations recorded
    pub fn num_generations(&self) -> usize {
        self.generations.len()
    }

    /// Get the final best fitness
    pub fn final_best_fitness(&self) -> Option<f64> {
        self.generations.last().map(|g| g.best_fitness)
    }

    /// Get the history of best fitness values
    pub fn best_fitness_history(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.best_fitness).collect()
    }

    /// Set the termination reason
    pub fn set_termination_reason(&mut self, reason: &str) {
        self.termination_reason = Some(reason.to_string());
    }

    /// Set the total runtime
    pub fn set_runtime(&mut self, duration: Duration) {
        self.total_runtime_ms = duration.as_secs_f64() * 1000.0;
    }

    /// Get a summary of the run
    pub fn summary(&self) -> String {
        format!(
            "Evolution Summary:\n\
             - Generations: {}\n\
             - Final best: {:.6}\n\
             - Runtime: {:.2}ms\n\
             - Termination: {}",
            self.num_generations(),
            self.final_best_fitness().unwrap_or(f64::INFINITY),
            self.total_runtime_ms,
            self.termination_reason.as_deref().unwrap_or("unknown")
        )
    }
}

/// Statistics for a single boosting round
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundStats {
    /// Round number, starting at 1
    pub round: usize,
    /// Step applied to the round's learner (multiplier times learning rate)
    pub step: f64,
    /// Loss metric of the ensemble on the training data
    pub train_loss: f64,
    /// Eval metric on validation data, when monitored this round
    pub val_score: Option<f64>,
    /// Ensemble length after the round
    pub n_learners: usize,
}

pub mod prelude {
    pub use super::{EvolutionStats, GenerationStats, RoundStats};
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn individual(expr: &str, fitness: f64) -> Individual {
        let mut ind = Individual::new(expr.parse().unwrap());
        ind.fitness = Some(fitness);
        ind.loss = Some(fitness / 2.0);
        ind
    }

    fn create_test_individuals() -> Vec<Individual> {
        vec![
            individual("x0", 10.0),
            individual("add(x0, x1)", 20.0),
            individual("x1", 30.0),
            individual("x0", 40.0),
            individual("x0", f64::INFINITY),
        ]
    }

    #[test]
    fn test_generation_stats_from_individuals() {
        let individuals = create_test_individuals();
        let stats = GenerationStats::from_individuals(&individuals, 3, 50);

        assert_eq!(stats.generation, 3);
        assert_eq!(stats.evaluations, 50);
        assert_eq!(stats.best_fitness, 10.0);
        assert_eq!(stats.best_loss, 5.0);
        assert_eq!(stats.mean_fitness, 25.0);
        assert_eq!(stats.median_fitness, 25.0);
        assert_eq!(stats.unfit, 1);
        assert_relative_eq!(stats.mean_size, 7.0 / 5.0);
        assert!(stats.val_score.is_none());
    }

    #[test]
    fn test_generation_stats_empty() {
        let stats = GenerationStats::from_individuals(&[], 0, 0);
        assert_eq!(stats.best_fitness, f64::INFINITY);
        assert_eq!(stats.mean_size, 0.0);
    }

    #[test]
    fn test_evolution_stats_history_and_summary() {
        let individuals = create_test_individuals();
        let mut stats = EvolutionStats::new();
        for i in 0..3 {
            stats.record(GenerationStats::from_individuals(&individuals[i..], i, i * 10));
        }
        assert_eq!(stats.best_fitness_history(), vec![10.0, 20.0, 30.0]);
        assert_eq!(stats.final_best_fitness(), Some(30.0));

        stats.set_termination_reason("Maximum generations reached");
        stats.set_runtime(Duration::from_millis(1234));
        let summary = stats.summary();
        assert!(summary.contains("Generations: 3"));
        assert!(summary.contains("Maximum generations reached"));
    }
}
