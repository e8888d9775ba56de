//! Genetic programming estimator
//!
//! Drives an [`IslandModel`] generation by generation until a termination
//! criterion triggers, then optionally polishes the constants of the best
//! program.

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rand::Rng;

use crate::algorithms::island::IslandModel;
use crate::config::{make_rng, GpConfig};
use crate::dataset::Dataset;
use crate::diagnostics::{EvolutionStats, GenerationStats};
use crate::error::{GpError, GpResult};
use crate::fitness::loss::LossFitness;
use crate::fitness::traits::Fitness;
use crate::metrics::Metric;
use crate::operators::mutation::ConstantMutation;
use crate::operators::reproduction::Breeder;
use crate::operators::traits::MutationOperator;
use crate::population::individual::Individual;
use crate::population::population::Population;
use crate::program::Program;
use crate::termination::{
    AnyOf, EvolutionState, FitnessStagnation, MaxGenerations, TerminationCriterion,
};

/// Symbolic regression by genetic programming
#[derive(Debug)]
pub struct GpEstimator {
    config: GpConfig,
    loss_metric: Box<dyn Metric>,
    eval_metric: Box<dyn Metric>,
    best: Option<Individual>,
    stats: EvolutionStats,
}

impl GpEstimator {
    /// Create an estimator, validating the configuration
    pub fn new(config: GpConfig) -> GpResult<Self> {
        config.validate()?;
        let loss_metric = config.build_loss_metric()?;
        let eval_metric = config.build_eval_metric()?;
        Ok(Self {
            config,
            loss_metric,
            eval_metric,
            best: None,
            stats: EvolutionStats::new(),
        })
    }

    /// The configuration
    pub fn config(&self) -> &GpConfig {
        &self.config
    }

    /// Best program of the last fit
    pub fn best_program(&self) -> Option<&Program> {
        self.best.as_ref().map(|b| b.program())
    }

    /// Best individual of the last fit, with its fitness and loss
    pub fn best(&self) -> Option<&Individual> {
        self.best.as_ref()
    }

    /// Per-generation statistics of the last fit
    pub fn history(&self) -> &[GenerationStats] {
        &self.stats.generations
    }

    /// Run statistics of the last fit
    pub fn stats(&self) -> &EvolutionStats {
        &self.stats
    }

    /// Evolve a program on `train`
    ///
    /// When `val` is supplied the eval metric of the best-so-far program on
    /// it is recorded every generation. An empty validation set counts as
    /// none.
    pub fn fit(&mut self, train: &Dataset, val: Option<&Dataset>) -> GpResult<Program> {
        let start_time = Instant::now();
        if train.n_rows() == 0 || train.n_features() == 0 {
            return Err(GpError::EmptyDataset);
        }
        let val = val.filter(|v| v.n_rows() > 0);

        let generator = self.config.tree_generator(train.n_features())?;
        let breeder = Breeder::new(
            &generator,
            self.config.point_mutation_rate,
            self.config.reproduction_probabilities(),
        );
        let fitness = LossFitness::new(
            train,
            self.loss_metric.as_ref(),
            self.config.parsimony_coeff,
        );
        let termination = self.termination();
        let mut rng = make_rng(self.config.seed);

        let mut model = IslandModel::new(
            self.config.n_populations,
            self.config.n_individuals,
            &generator,
            &mut rng,
        );

        let mut stats = EvolutionStats::new();
        let mut fitness_history: Vec<f64> = Vec::new();

        let gen_start = Instant::now();
        model.initialize(&fitness)?;
        let gen_stats = self.generation_stats(&model, val, gen_start.elapsed())?;
        fitness_history.push(best_fitness(&model));
        stats.record(gen_stats);

        loop {
            let state = EvolutionState {
                generation: model.generation,
                fitness_history: &fitness_history,
            };
            if let Some(reason) = termination.triggered(&state) {
                stats.set_termination_reason(reason);
                break;
            }

            let gen_start = Instant::now();
            model.step(&fitness, &breeder)?;
            let gen_stats = self.generation_stats(&model, val, gen_start.elapsed())?;
            fitness_history.push(best_fitness(&model));
            stats.record(gen_stats);
        }
        model.converge();

        let mut best = model.global_best.take().ok_or(GpError::EmptyPopulation)?;
        if self.config.polish_best && self.config.n_polish_generations > 0 {
            best = self.polish(best, &fitness, &mut rng);
        }

        stats.set_runtime(start_time.elapsed());
        if self.config.verbose {
            info!(
                "fit finished after {} generations ({}): best fitness {:.6}, {}",
                model.generation,
                stats.termination_reason.as_deref().unwrap_or("unknown"),
                best.fitness_or_worst(),
                best.program()
            );
        }

        let program = best.program().clone();
        self.best = Some(best);
        self.stats = stats;
        Ok(program)
    }

    fn termination(&self) -> AnyOf {
        let mut criteria: Vec<Box<dyn TerminationCriterion>> =
            vec![Box::new(MaxGenerations::new(self.config.n_generations))];
        if self.config.n_stagnation_generations > 0 {
            criteria.push(Box::new(FitnessStagnation::new(
                self.config.n_stagnation_generations,
                0.0,
            )));
        }
        AnyOf::new(criteria)
    }

    fn generation_stats(
        &self,
        model: &IslandModel,
        val: Option<&Dataset>,
        elapsed: Duration,
    ) -> GpResult<GenerationStats> {
        let mut stats = GenerationStats::from_individuals(
            model.individuals(),
            model.generation,
            model.total_evaluations(),
        )
        .with_elapsed(elapsed);

        if let (Some(val), Some(best)) = (val, model.global_best.as_ref()) {
            let preds = best.program().predict(val)?;
            stats = stats.with_val_score(Some(self.eval_metric.score(
                val.y(),
                &preds,
                val.weights(),
            )));
        }

        let population_size = self.config.n_populations * self.config.n_individuals;
        if stats.unfit == population_size {
            warn!(
                "generation {}: every individual is unfit",
                stats.generation
            );
        }

        if self.config.verbose {
            match stats.val_score {
                Some(score) => info!(
                    "generation {}: train {} {:.6}, val {} {:.6}, mean size {:.1}",
                    stats.generation,
                    self.loss_metric.name(),
                    stats.best_loss,
                    self.eval_metric.name(),
                    score,
                    stats.mean_size
                ),
                None => info!(
                    "generation {}: train {} {:.6}, mean size {:.1}",
                    stats.generation,
                    self.loss_metric.name(),
                    stats.best_loss,
                    stats.mean_size
                ),
            }
        }
        Ok(stats)
    }

    /// (1+λ) refinement of the constants of `best`
    fn polish<Fit: Fitness, R: Rng>(
        &self,
        best: Individual,
        fitness: &Fit,
        rng: &mut R,
    ) -> Individual {
        if best.program().root().n_constants() == 0 {
            return best;
        }
        let mutation = ConstantMutation::default();
        let mut incumbent = best;

        for generation in 0..self.config.n_polish_generations {
            let candidates: Vec<Individual> = (0..self.config.n_individuals)
                .map(|_| Individual::new(mutation.mutate(incumbent.program(), rng)))
                .collect();
            let mut population = Population::from_individuals(candidates);
            population.evaluate_parallel(fitness);

            if let Some(candidate) = population.best() {
                if candidate.is_better_than(&incumbent) {
                    debug!(
                        "polish generation {}: fitness {:.6} -> {:.6}",
                        generation,
                        incumbent.fitness_or_worst(),
                        candidate.fitness_or_worst()
                    );
                    incumbent = candidate.clone();
                }
            }
        }
        incumbent
    }
}

fn best_fitness(model: &IslandModel) -> f64 {
    model
        .global_best
        .as_ref()
        .map_or(f64::INFINITY, |b| b.fitness_or_worst())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        let rows: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64 / 10.0, 1.0]).collect();
        let y = rows.iter().map(|r| 2.0 * r[0] + 0.5).collect();
        Dataset::from_rows(&rows, y, None).unwrap()
    }

    fn config() -> GpConfig {
        GpConfig::new()
            .funcs("add,sub,mul")
            .heights(1, 4)
            .populations(2, 30)
            .generations(5)
            .seed(7)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(matches!(
            GpEstimator::new(config().loss_metric("nope")),
            Err(GpError::UnknownMetric(_))
        ));
        assert!(matches!(
            GpEstimator::new(config().heights(4, 1)),
            Err(GpError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_fit_records_history() {
        let ds = dataset();
        let mut estimator = GpEstimator::new(config()).unwrap();
        let program = estimator.fit(&ds, None).unwrap();

        assert_eq!(estimator.best_program(), Some(&program));
        assert_eq!(estimator.history().len(), 6);
        assert_eq!(
            estimator.stats().termination_reason.as_deref(),
            Some("Maximum generations reached")
        );
        let heights_ok = (1..=4).contains(&program.height());
        assert!(heights_ok);
    }

    #[test]
    fn test_fit_with_validation_scores() {
        let ds = dataset();
        let mut estimator = GpEstimator::new(config().eval_metric("r2")).unwrap();
        estimator.fit(&ds, Some(&ds)).unwrap();
        assert!(estimator.history().iter().all(|g| g.val_score.is_some()));
    }

    #[test]
    fn test_fit_zero_generations() {
        let ds = dataset();
        let mut estimator = GpEstimator::new(config().generations(0)).unwrap();
        estimator.fit(&ds, None).unwrap();
        assert_eq!(estimator.history().len(), 1);
    }

    #[test]
    fn test_stagnation_stops_early() {
        let ds = dataset();
        let mut cfg = config().generations(200);
        cfg.n_stagnation_generations = 3;
        let mut estimator = GpEstimator::new(cfg).unwrap();
        estimator.fit(&ds, None).unwrap();
        let generations = estimator.history().len() - 1;
        assert!(generations < 200);
        assert_eq!(
            estimator.stats().termination_reason.as_deref(),
            Some("Fitness stagnation detected")
        );
    }

    #[test]
    fn test_polish_never_worsens() {
        let ds = dataset();
        let mut plain = GpEstimator::new(config()).unwrap();
        plain.fit(&ds, None).unwrap();
        let mut polished = GpEstimator::new(config().polish(5)).unwrap();
        polished.fit(&ds, None).unwrap();

        let before = plain.best().unwrap();
        let after = polished.best().unwrap();
        assert!(after.fitness_or_worst() <= before.fitness_or_worst());
        assert_eq!(after.program().size(), before.program().size());
    }
}
