//! Selection operators

use rand::seq::index::sample;
use rand::Rng;

use crate::operators::traits::SelectionOperator;
use crate::population::individual::Individual;

/// Tournament selection operator
///
/// Selects the best individual from a random subset of the population.
/// Lower fitness wins; equal fitness goes to the smaller program.
#[derive(Clone, Debug)]
pub struct TournamentSelection {
    /// Tournament size (number of individuals competing)
    pub tournament_size: usize,
}

impl TournamentSelection {
    /// Create a new tournament selection with the given size
    pub fn new(tournament_size: usize) -> Self {
        Self {
            tournament_size: tournament_size.max(1),
        }
    }
}

impl Default for TournamentSelection {
    fn default() -> Self {
        Self::new(3)
    }
}

impl SelectionOperator for TournamentSelection {
    fn select<R: Rng>(&self, population: &[Individual], rng: &mut R) -> usize {
        let tournament_size = self.tournament_size.min(population.len());
        sample(rng, population.len(), tournament_size)
            .into_iter()
            .min_by(|&a, &b| population[a].compare(&population[b]))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn population(fitnesses: &[f64]) -> Vec<Individual> {
        fitnesses
            .iter()
            .map(|&f| {
                let mut ind = Individual::new("x0".parse().unwrap());
                ind.fitness = Some(f);
                ind
            })
            .collect()
    }

    #[test]
    fn test_tournament_selection_in_range() {
        let mut rng = StdRng::seed_from_u64(0);
        let pop = population(&[5.0, 4.0, 3.0, 2.0, 1.0]);
        let selection = TournamentSelection::default();
        for idx in selection.select_many(&pop, 100, &mut rng) {
            assert!(idx < pop.len());
        }
    }

    #[test]
    fn test_full_tournament_picks_lowest_fitness() {
        let mut rng = StdRng::seed_from_u64(1);
        let pop = population(&[3.0, 0.5, f64::INFINITY]);
        let selection = TournamentSelection::new(3);
        for _ in 0..20 {
            assert_eq!(selection.select(&pop, &mut rng), 1);
        }
    }

    #[test]
    fn test_tournament_size_one_is_uniform() {
        let mut rng = StdRng::seed_from_u64(2);
        let pop = population(&[1.0, 2.0]);
        let selection = TournamentSelection::new(1);
        let picks = selection.select_many(&pop, 200, &mut rng);
        assert!(picks.contains(&0));
        assert!(picks.contains(&1));
    }

    #[test]
    fn test_tie_goes_to_smaller_program() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut pop = population(&[1.0, 1.0]);
        pop[0] = Individual::new("add(x0, 0.0)".parse().unwrap());
        pop[0].fitness = Some(1.0);
        assert_eq!(TournamentSelection::new(2).select(&pop, &mut rng), 1);
    }
}
