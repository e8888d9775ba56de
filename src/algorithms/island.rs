//! Island model
//!
//! Several populations (islands) evolve independently. Every island owns its
//! own random stream, seeded from the master stream when the model is built,
//! so a run is reproducible whatever order the islands are stepped in.
//! Islands are stepped together one generation at a time; with the `parallel`
//! feature they run as rayon tasks joined at each generation boundary.
//! Islands never exchange individuals.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{GpError, GpResult};
use crate::fitness::traits::Fitness;
use crate::operators::reproduction::Breeder;
use crate::population::individual::Individual;
use crate::population::population::Population;
use crate::program::TreeGenerator;

/// Lifecycle of an island
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IslandState {
    /// Random population created, not yet evolved
    Initialized,
    /// At least one generation completed
    Evolving {
        /// Number of completed generations
        generation: usize,
    },
    /// Run finished; the island no longer changes
    Converged,
}

/// State of a single island
#[derive(Clone, Debug)]
pub struct Island {
    /// Island index
    pub index: usize,
    /// Current population
    pub population: Population,
    /// Best individual found on this island
    pub best: Option<Individual>,
    /// Lifecycle state
    pub state: IslandState,
    /// Total fitness evaluations on this island
    pub evaluations: usize,
    rng: StdRng,
}

impl Island {
    /// Create a new island with a random population
    pub fn new(index: usize, size: usize, generator: &TreeGenerator, seed: [u8; 32]) -> Self {
        let mut rng = StdRng::from_seed(seed);
        let population = Population::random(size, generator, &mut rng);
        Self {
            index,
            population,
            best: None,
            state: IslandState::Initialized,
            evaluations: 0,
            rng,
        }
    }

    /// Number of completed generations
    pub fn generation(&self) -> usize {
        self.population.generation()
    }

    /// Evaluate individuals lacking a fitness and update the island best
    pub fn evaluate<Fit: Fitness>(&mut self, fitness: &Fit) {
        self.evaluations += self.population.evaluate_parallel(fitness);
        if let Some(current_best) = self.population.best() {
            match &self.best {
                Some(best) if !current_best.is_better_than(best) => {}
                _ => self.best = Some(current_best.clone()),
            }
        }
    }

    /// Run one generation of evolution on this island
    ///
    /// The offspring replace the whole population; the island best is kept
    /// separately. A converged island is left untouched.
    pub fn evolve_one_generation<Fit: Fitness>(
        &mut self,
        fitness: &Fit,
        breeder: &Breeder,
    ) -> GpResult<()> {
        if self.state == IslandState::Converged {
            return Ok(());
        }
        if self.population.is_empty() {
            return Err(GpError::EmptyPopulation);
        }
        if !self.population.all_evaluated() {
            self.evaluate(fitness);
        }

        let generation = self.population.generation() + 1;
        let offspring = breeder.next_generation(
            self.population.individuals(),
            generation,
            &mut self.rng,
        );
        self.population.replace(offspring);
        self.population.increment_generation();
        self.evaluate(fitness);

        self.state = IslandState::Evolving { generation };
        Ok(())
    }

    /// Mark the island as finished
    pub fn converge(&mut self) {
        self.state = IslandState::Converged;
    }
}

/// Independent islands evolved in lock-step
#[derive(Clone, Debug)]
pub struct IslandModel {
    /// The islands
    pub islands: Vec<Island>,
    /// Best individual over every island and generation
    pub global_best: Option<Individual>,
    /// Number of completed generations
    pub generation: usize,
}

impl IslandModel {
    /// Create `n_islands` random islands, seeding each from `rng`
    pub fn new<R: Rng>(
        n_islands: usize,
        island_size: usize,
        generator: &TreeGenerator,
        rng: &mut R,
    ) -> Self {
        let islands = (0..n_islands)
            .map(|i| Island::new(i, island_size, generator, rng.gen()))
            .collect();
        Self {
            islands,
            global_best: None,
            generation: 0,
        }
    }

    /// Evaluate the initial populations
    pub fn initialize<Fit: Fitness>(&mut self, fitness: &Fit) -> GpResult<()> {
        #[cfg(feature = "parallel")]
        self.islands
            .par_iter_mut()
            .for_each(|island| island.evaluate(fitness));
        #[cfg(not(feature = "parallel"))]
        self.islands
            .iter_mut()
            .for_each(|island| island.evaluate(fitness));

        self.update_global_best()
    }

    /// Perform one generation step on all islands
    pub fn step<Fit: Fitness>(&mut self, fitness: &Fit, breeder: &Breeder) -> GpResult<()> {
        #[cfg(feature = "parallel")]
        self.islands
            .par_iter_mut()
            .try_for_each(|island| island.evolve_one_generation(fitness, breeder))?;
        #[cfg(not(feature = "parallel"))]
        self.islands
            .iter_mut()
            .try_for_each(|island| island.evolve_one_generation(fitness, breeder))?;

        self.generation += 1;
        self.update_global_best()
    }

    /// Mark every island as finished
    pub fn converge(&mut self) {
        for island in &mut self.islands {
            island.converge();
        }
    }

    /// Total evaluations across all islands
    pub fn total_evaluations(&self) -> usize {
        self.islands.iter().map(|i| i.evaluations).sum()
    }

    /// Every individual of every island
    pub fn individuals(&self) -> impl Iterator<Item = &Individual> {
        self.islands.iter().flat_map(|i| i.population.iter())
    }

    fn update_global_best(&mut self) -> GpResult<()> {
        for island in &self.islands {
            if let Some(island_best) = &island.best {
                match &self.global_best {
                    Some(global) if !island_best.is_better_than(global) => {}
                    _ => self.global_best = Some(island_best.clone()),
                }
            }
        }
        if self.global_best.is_none() {
            return Err(GpError::EmptyPopulation);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::fitness::loss::LossFitness;
    use crate::metrics::Mae;
    use crate::operators::reproduction::ReproductionProbabilities;
    use crate::program::FunctionSet;

    fn dataset() -> Dataset {
        let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64 / 4.0]).collect();
        let y = rows.iter().map(|r| r[0] * r[0] + 1.0).collect();
        Dataset::from_rows(&rows, y, None).unwrap()
    }

    fn generator() -> TreeGenerator {
        TreeGenerator::new(FunctionSet::parse("add,sub,mul").unwrap(), 1).heights(1, 4)
    }

    fn breeder() -> Breeder {
        Breeder::new(
            &generator(),
            0.5,
            ReproductionProbabilities {
                point_mutation: 0.1,
                subtree_mutation: 0.1,
                hoist_mutation: 0.1,
                subtree_crossover: 0.3,
            },
        )
    }

    #[test]
    fn test_island_creation() {
        let island = Island::new(2, 15, &generator(), [7; 32]);
        assert_eq!(island.index, 2);
        assert_eq!(island.population.len(), 15);
        assert_eq!(island.state, IslandState::Initialized);
        assert!(island.best.is_none());
    }

    #[test]
    fn test_island_lifecycle() {
        let ds = dataset();
        let fitness = LossFitness::new(&ds, &Mae, 0.0);
        let mut island = Island::new(0, 20, &generator(), [1; 32]);

        island.evolve_one_generation(&fitness, &breeder()).unwrap();
        assert_eq!(island.state, IslandState::Evolving { generation: 1 });
        island.evolve_one_generation(&fitness, &breeder()).unwrap();
        assert_eq!(island.state, IslandState::Evolving { generation: 2 });
        assert_eq!(island.population.len(), 20);

        island.converge();
        let before = island.population.clone().into_individuals();
        island.evolve_one_generation(&fitness, &breeder()).unwrap();
        assert_eq!(island.state, IslandState::Converged);
        assert_eq!(island.population.individuals(), &before[..]);
    }

    #[test]
    fn test_island_model_best_never_worsens() {
        let ds = dataset();
        let fitness = LossFitness::new(&ds, &Mae, 0.001);
        let mut rng = StdRng::seed_from_u64(42);
        let mut model = IslandModel::new(3, 20, &generator(), &mut rng);
        model.initialize(&fitness).unwrap();

        let mut previous = model.global_best.as_ref().unwrap().fitness_or_worst();
        for _ in 0..5 {
            model.step(&fitness, &breeder()).unwrap();
            let current = model.global_best.as_ref().unwrap().fitness_or_worst();
            assert!(current <= previous);
            previous = current;
        }
        assert_eq!(model.generation, 5);
        assert!(model.islands.iter().all(|i| i.population.len() == 20));
        assert!(model.total_evaluations() >= 3 * 20);
        assert!(model.total_evaluations() <= 3 * 20 * 6);
    }

    #[test]
    fn test_island_model_is_reproducible() {
        let ds = dataset();
        let fitness = LossFitness::new(&ds, &Mae, 0.0);
        let run = || {
            let mut rng = StdRng::seed_from_u64(9);
            let mut model = IslandModel::new(2, 10, &generator(), &mut rng);
            model.initialize(&fitness).unwrap();
            for _ in 0..3 {
                model.step(&fitness, &breeder()).unwrap();
            }
            model.global_best.unwrap().program().to_string()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_empty_islands() {
        let ds = dataset();
        let fitness = LossFitness::new(&ds, &Mae, 0.0);
        let mut rng = StdRng::seed_from_u64(0);
        let mut model = IslandModel::new(1, 0, &generator(), &mut rng);
        assert!(matches!(
            model.initialize(&fitness),
            Err(GpError::EmptyPopulation)
        ));
    }
}
