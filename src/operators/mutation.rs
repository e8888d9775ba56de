//! Mutation operators
//!
//! Structural mutations (point, subtree, hoist) used during evolution, and a
//! constant-only mutation used to polish a finished program.

use rand::Rng;
use rand_distr::StandardNormal;

use crate::operators::traits::MutationOperator;
use crate::program::{Node, Program, TreeGenerator};

/// Point mutation
///
/// Visits every node and, with probability `rate`, swaps it for a random
/// node of the same arity. Leaves become new random leaves; function nodes
/// keep their children and change operator. Height never changes.
#[derive(Clone, Debug)]
pub struct PointMutation {
    /// Per-node mutation probability
    pub rate: f64,
    generator: TreeGenerator,
}

impl PointMutation {
    /// Create a point mutation drawing replacements from `generator`
    pub fn new(rate: f64, generator: TreeGenerator) -> Self {
        Self { rate, generator }
    }

    fn mutate_node<R: Rng>(&self, node: &mut Node, rng: &mut R) {
        let hit = rng.gen_bool(self.rate);
        match node {
            Node::Function(op, children) => {
                if hit {
                    if let Some(replacement) =
                        self.generator.function_set.random_with_arity(op.arity(), rng)
                    {
                        *op = replacement;
                    }
                }
                for child in children {
                    self.mutate_node(child, rng);
                }
            }
            _ => {
                if hit {
                    *node = self.generator.random_leaf(rng);
                }
            }
        }
    }
}

impl MutationOperator for PointMutation {
    fn mutate<R: Rng>(&self, program: &Program, rng: &mut R) -> Program {
        let mut child = program.clone();
        self.mutate_node(child.root_mut(), rng);
        child
    }
}

/// Subtree mutation
///
/// Replaces a random node with a freshly generated subtree, sized so the
/// result cannot exceed the generator's maximum height.
#[derive(Clone, Debug)]
pub struct SubtreeMutation {
    generator: TreeGenerator,
}

impl SubtreeMutation {
    /// Create a subtree mutation drawing subtrees from `generator`
    pub fn new(generator: TreeGenerator) -> Self {
        Self { generator }
    }
}

impl MutationOperator for SubtreeMutation {
    fn mutate<R: Rng>(&self, program: &Program, rng: &mut R) -> Program {
        let positions = program.root().positions();
        let pos = &positions[rng.gen_range(0..positions.len())];
        let room = self.generator.max_height.saturating_sub(pos.len());
        let subtree = self.generator.generate_subtree(rng, room);

        let mut child = program.clone();
        child.root_mut().replace_subtree(pos, subtree);
        child
    }
}

/// Hoist mutation
///
/// Promotes a random proper subtree to be the whole program.
#[derive(Clone, Copy, Debug, Default)]
pub struct HoistMutation;

impl HoistMutation {
    /// Create a hoist mutation
    pub fn new() -> Self {
        Self
    }
}

impl MutationOperator for HoistMutation {
    fn mutate<R: Rng>(&self, program: &Program, rng: &mut R) -> Program {
        let positions = program.root().positions();
        if positions.len() < 2 {
            return program.clone();
        }
        // Skip the root itself
        let pos = &positions[rng.gen_range(1..positions.len())];
        match program.root().get_subtree(pos) {
            Some(subtree) => Program::new(subtree.clone()),
            None => program.clone(),
        }
    }
}

/// Gaussian perturbation of every constant
///
/// Each constant `c` moves by a normal draw with standard deviation
/// `sigma * max(|c|, 1)`. The tree structure is untouched.
#[derive(Clone, Copy, Debug)]
pub struct ConstantMutation {
    /// Relative standard deviation
    pub sigma: f64,
}

impl ConstantMutation {
    /// Create a constant mutation with the given relative standard deviation
    pub fn new(sigma: f64) -> Self {
        Self { sigma }
    }
}

impl Default for ConstantMutation {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl MutationOperator for ConstantMutation {
    fn mutate<R: Rng>(&self, program: &Program, rng: &mut R) -> Program {
        let mut child = program.clone();
        child.root_mut().for_each_constant_mut(&mut |c: &mut f64| {
            let z: f64 = rng.sample(StandardNormal);
            let shifted = *c + z * self.sigma * c.abs().max(1.0);
            if shifted.is_finite() {
                *c = shifted;
            }
        });
        child
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::FunctionSet;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generator() -> TreeGenerator {
        TreeGenerator::new(FunctionSet::parse("add,sub,mul,cos,sin").unwrap(), 2).heights(1, 4)
    }

    fn program() -> Program {
        "add(mul(x0, 2.0), cos(x1))".parse().unwrap()
    }

    #[test]
    fn test_point_mutation_keeps_shape() {
        let mut rng = StdRng::seed_from_u64(11);
        let op = PointMutation::new(1.0, generator());
        let parent = program();
        for _ in 0..20 {
            let child = op.mutate(&parent, &mut rng);
            assert_eq!(child.height(), parent.height());
            assert_eq!(child.size(), parent.size());
        }
    }

    #[test]
    fn test_point_mutation_zero_rate_is_identity() {
        let mut rng = StdRng::seed_from_u64(11);
        let op = PointMutation::new(0.0, generator());
        assert_eq!(op.mutate(&program(), &mut rng), program());
    }

    #[test]
    fn test_subtree_mutation_respects_max_height() {
        let mut rng = StdRng::seed_from_u64(12);
        let op = SubtreeMutation::new(generator());
        for _ in 0..100 {
            assert!(op.mutate(&program(), &mut rng).height() <= 4);
        }
    }

    #[test]
    fn test_hoist_mutation_returns_proper_subtree() {
        let mut rng = StdRng::seed_from_u64(13);
        let parent = program();
        for _ in 0..20 {
            let child = HoistMutation.mutate(&parent, &mut rng);
            assert!(child.size() < parent.size());
            let text = child.to_string();
            assert!(parent.to_string().contains(&text));
        }
        let leaf: Program = "x0".parse().unwrap();
        assert_eq!(HoistMutation.mutate(&leaf, &mut rng), leaf);
    }

    #[test]
    fn test_constant_mutation_only_touches_constants() {
        let mut rng = StdRng::seed_from_u64(14);
        let parent = program();
        let child = ConstantMutation::default().mutate(&parent, &mut rng);
        assert_eq!(child.size(), parent.size());
        assert_ne!(child, parent);
        let mut restored = child.clone();
        restored
            .root_mut()
            .for_each_constant_mut(&mut |c: &mut f64| *c = 2.0);
        assert_eq!(restored, parent);
    }

    #[test]
    fn test_constant_mutation_keeps_constants_finite() {
        let mut rng = StdRng::seed_from_u64(15);
        let parent: Program = "add(x0, 1e308)".parse().unwrap();
        let mutation = ConstantMutation::new(1e10);
        for _ in 0..20 {
            let mut child = mutation.mutate(&parent, &mut rng);
            child
                .root_mut()
                .for_each_constant_mut(&mut |c: &mut f64| assert!(c.is_finite()));
            assert!(child.to_json().is_ok());
        }
    }
}
