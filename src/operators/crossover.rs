//! Crossover operators

use rand::Rng;

use crate::operators::traits::CrossoverOperator;
use crate::program::Program;

/// Subtree crossover
///
/// Picks a random node in each parent and replaces the recipient's node with
/// a copy of the donor's subtree. Produces a single offspring.
#[derive(Clone, Copy, Debug, Default)]
pub struct SubtreeCrossover;

impl SubtreeCrossover {
    /// Create a subtree crossover
    pub fn new() -> Self {
        Self
    }
}

impl CrossoverOperator for SubtreeCrossover {
    fn crossover<R: Rng>(&self, recipient: &Program, donor: &Program, rng: &mut R) -> Program {
        let positions1 = recipient.root().positions();
        let positions2 = donor.root().positions();

        let pos1 = &positions1[rng.gen_range(0..positions1.len())];
        let pos2 = &positions2[rng.gen_range(0..positions2.len())];

        match donor.root().get_subtree(pos2) {
            Some(subtree) => {
                let mut child = recipient.clone();
                child.root_mut().replace_subtree(pos1, subtree.clone());
                child
            }
            None => recipient.clone(),
        }
    }
}
