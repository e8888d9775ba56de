//! Offspring production
//!
//! Each offspring slot draws exactly one reproduction operator by cumulative
//! probability over point, subtree and hoist mutation and subtree crossover.
//! Leftover probability mass copies the selected parent unchanged. Structural
//! operators run through the height-bounded wrappers and fall back to a copy
//! when every attempt leaves the height range.

use log::debug;
use rand::Rng;

use crate::error::OperatorResult;
use crate::operators::crossover::SubtreeCrossover;
use crate::operators::mutation::{HoistMutation, PointMutation, SubtreeMutation};
use crate::operators::selection::TournamentSelection;
use crate::operators::traits::{
    crossover_bounded, mutate_bounded, HeightBounds, SelectionOperator,
};
use crate::population::individual::Individual;
use crate::program::{Program, TreeGenerator};

/// Which operator produced an offspring
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reproduction {
    /// Point mutation
    PointMutation,
    /// Subtree mutation
    SubtreeMutation,
    /// Hoist mutation
    HoistMutation,
    /// Subtree crossover
    SubtreeCrossover,
    /// Unchanged copy of a parent
    Copy,
}

/// Per-offspring operator probabilities
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReproductionProbabilities {
    pub point_mutation: f64,
    pub subtree_mutation: f64,
    pub hoist_mutation: f64,
    pub subtree_crossover: f64,
}

impl ReproductionProbabilities {
    /// Draw one operator
    ///
    /// When the probabilities sum above 1 they are rescaled to sum to 1 and
    /// [`Reproduction::Copy`] is never drawn.
    pub fn choose<R: Rng>(&self, rng: &mut R) -> Reproduction {
        let table = [
            (self.point_mutation, Reproduction::PointMutation),
            (self.subtree_mutation, Reproduction::SubtreeMutation),
            (self.hoist_mutation, Reproduction::HoistMutation),
            (self.subtree_crossover, Reproduction::SubtreeCrossover),
        ];
        let total: f64 = table.iter().map(|(p, _)| p).sum();
        let r = rng.gen::<f64>() * total.max(1.0);

        let mut cumulative = 0.0;
        for (p, kind) in table {
            cumulative += p;
            if r < cumulative {
                return kind;
            }
        }
        Reproduction::Copy
    }
}

/// One produced offspring
#[derive(Clone, Debug)]
pub struct Offspring {
    /// The new individual
    pub individual: Individual,
    /// Operator that was drawn
    pub kind: Reproduction,
    /// False when the operator exhausted its retries and the parent was copied
    pub applied: bool,
}

/// Produces a new generation from an evaluated one
#[derive(Clone, Debug)]
pub struct Breeder {
    point: PointMutation,
    subtree: SubtreeMutation,
    hoist: HoistMutation,
    crossover: SubtreeCrossover,
    selection: TournamentSelection,
    probabilities: ReproductionProbabilities,
    bounds: HeightBounds,
}

impl Breeder {
    /// Create a breeder whose height bounds come from `generator`
    pub fn new(
        generator: &TreeGenerator,
        point_mutation_rate: f64,
        probabilities: ReproductionProbabilities,
    ) -> Self {
        Self {
            point: PointMutation::new(point_mutation_rate, generator.clone()),
            subtree: SubtreeMutation::new(generator.clone()),
            hoist: HoistMutation::new(),
            crossover: SubtreeCrossover::new(),
            selection: TournamentSelection::default(),
            probabilities,
            bounds: HeightBounds::new(generator.min_height, generator.max_height),
        }
    }

    /// Height bounds every offspring satisfies
    pub fn bounds(&self) -> HeightBounds {
        self.bounds
    }

    /// Produce a single offspring from `pool`
    pub fn breed<R: Rng>(&self, pool: &[Individual], generation: usize, rng: &mut R) -> Offspring {
        let parent = &pool[self.selection.select(pool, rng)];
        let kind = self.probabilities.choose(rng);

        let result: OperatorResult<Program> = match kind {
            Reproduction::PointMutation => {
                mutate_bounded(&self.point, parent.program(), self.bounds, rng)
            }
            Reproduction::SubtreeMutation => {
                mutate_bounded(&self.subtree, parent.program(), self.bounds, rng)
            }
            Reproduction::HoistMutation => {
                mutate_bounded(&self.hoist, parent.program(), self.bounds, rng)
            }
            Reproduction::SubtreeCrossover => {
                let donor = &pool[self.selection.select(pool, rng)];
                crossover_bounded(
                    &self.crossover,
                    parent.program(),
                    donor.program(),
                    self.bounds,
                    rng,
                )
            }
            Reproduction::Copy => {
                return Offspring {
                    individual: parent.clone(),
                    kind,
                    applied: true,
                }
            }
        };

        match result {
            OperatorResult::Success(program) => Offspring {
                individual: Individual::with_generation(program, generation),
                kind,
                applied: true,
            },
            OperatorResult::Failed(err) => {
                debug!("{:?} fell back to a copy: {}", kind, err);
                Offspring {
                    individual: parent.clone(),
                    kind,
                    applied: false,
                }
            }
        }
    }

    /// Produce `pool.len()` offspring that replace the whole generation
    pub fn next_generation<R: Rng>(
        &self,
        pool: &[Individual],
        generation: usize,
        rng: &mut R,
    ) -> Vec<Individual> {
        (0..pool.len())
            .map(|_| self.breed(pool, generation, rng).individual)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::FunctionSet;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn probabilities(p: [f64; 4]) -> ReproductionProbabilities {
        ReproductionProbabilities {
            point_mutation: p[0],
            subtree_mutation: p[1],
            hoist_mutation: p[2],
            subtree_crossover: p[3],
        }
    }

    fn generator() -> TreeGenerator {
        TreeGenerator::new(FunctionSet::parse("add,sub,mul").unwrap(), 2).heights(2, 4)
    }

    fn pool(rng: &mut StdRng) -> Vec<Individual> {
        let gen = generator();
        (0..10)
            .map(|i| {
                let mut ind = Individual::new(Program::new(gen.generate(rng)));
                ind.fitness = Some(i as f64);
                ind
            })
            .collect()
    }

    #[test]
    fn test_choose_copy_when_all_zero() {
        let mut rng = StdRng::seed_from_u64(0);
        let probs = probabilities([0.0; 4]);
        for _ in 0..50 {
            assert_eq!(probs.choose(&mut rng), Reproduction::Copy);
        }
    }

    #[test]
    fn test_choose_normalises_above_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let probs = probabilities([1.0, 1.0, 0.0, 1.0]);
        for _ in 0..200 {
            let kind = probs.choose(&mut rng);
            assert_ne!(kind, Reproduction::Copy);
            assert_ne!(kind, Reproduction::HoistMutation);
        }
    }

    #[test]
    fn test_choose_single_operator() {
        let mut rng = StdRng::seed_from_u64(2);
        let probs = probabilities([0.0, 0.0, 0.0, 1.0]);
        for _ in 0..50 {
            assert_eq!(probs.choose(&mut rng), Reproduction::SubtreeCrossover);
        }
    }

    #[test]
    fn test_next_generation_keeps_size_and_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let pool = pool(&mut rng);
        let breeder = Breeder::new(&generator(), 0.5, probabilities([0.2, 0.2, 0.2, 0.3]));
        let next = breeder.next_generation(&pool, 1, &mut rng);
        assert_eq!(next.len(), pool.len());
        for ind in &next {
            assert!(breeder.bounds().contains(ind.program()));
        }
    }

    #[test]
    fn test_crossover_only_offspring() {
        let mut rng = StdRng::seed_from_u64(4);
        let pool = pool(&mut rng);
        let breeder = Breeder::new(&generator(), 0.5, probabilities([0.0, 0.0, 0.0, 1.0]));
        for _ in 0..30 {
            let child = breeder.breed(&pool, 1, &mut rng);
            assert_eq!(child.kind, Reproduction::SubtreeCrossover);
            if child.applied {
                assert!(!child.individual.is_evaluated());
                assert_eq!(child.individual.birth_generation, 1);
            }
        }
    }
}
