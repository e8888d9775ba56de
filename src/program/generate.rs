//! Random tree generation
//!
//! Ramped half-and-half: each tree draws a target height uniformly from the
//! allowed range and is then grown either "full" (every leaf at the target
//! height) or "grow" (leaves may appear once the minimum height is reached).

use rand::Rng;

use super::node::Node;
use super::op::FunctionSet;

/// Generator for random expression trees
#[derive(Clone, Debug)]
pub struct TreeGenerator {
    /// Operators available to function nodes
    pub function_set: FunctionSet,
    /// Number of features terminals may reference
    pub n_features: usize,
    /// Lower bound for random constants
    pub const_min: f64,
    /// Upper bound for random constants
    pub const_max: f64,
    /// Probability that a leaf is a constant
    pub p_const: f64,
    /// Probability of growing a full tree
    pub p_full: f64,
    /// Probability of stopping at a leaf once the minimum height is reached
    pub p_leaf: f64,
    /// Minimum tree height
    pub min_height: usize,
    /// Maximum tree height
    pub max_height: usize,
}

impl TreeGenerator {
    /// Create a generator with default leaf and shape probabilities
    pub fn new(function_set: FunctionSet, n_features: usize) -> Self {
        Self {
            function_set,
            n_features,
            const_min: -5.0,
            const_max: 5.0,
            p_const: 0.5,
            p_full: 0.5,
            p_leaf: 0.3,
            min_height: 3,
            max_height: 5,
        }
    }

    /// Set the height range
    pub fn heights(mut self, min_height: usize, max_height: usize) -> Self {
        self.min_height = min_height;
        self.max_height = max_height;
        self
    }

    /// Set the constant range
    pub fn constants(mut self, const_min: f64, const_max: f64) -> Self {
        self.const_min = const_min;
        self.const_max = const_max;
        self
    }

    /// Generate a tree with ramped half-and-half
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Node {
        let height = rng.gen_range(self.min_height..=self.max_height.max(self.min_height));
        let full = rng.gen_bool(self.p_full);
        self.generate_with(rng, height, self.min_height.min(height), full)
    }

    /// Generate a subtree no taller than `max_height`, for replacing a node
    pub fn generate_subtree<R: Rng>(&self, rng: &mut R, max_height: usize) -> Node {
        let height = rng.gen_range(0..=max_height);
        let full = rng.gen_bool(self.p_full);
        self.generate_with(rng, height, 0, full)
    }

    /// Generate a tree of the given target height
    ///
    /// Full trees reach `height` on every branch. Grow trees only place
    /// functions above depth `min_height`.
    pub fn generate_with<R: Rng>(
        &self,
        rng: &mut R,
        height: usize,
        min_height: usize,
        full: bool,
    ) -> Node {
        if full {
            self.full_node(rng, 0, height)
        } else {
            self.grow_node(rng, 0, min_height, height)
        }
    }

    fn full_node<R: Rng>(&self, rng: &mut R, depth: usize, height: usize) -> Node {
        if depth >= height {
            return self.random_leaf(rng);
        }
        let op = self.function_set.random(rng);
        let children = (0..op.arity())
            .map(|_| self.full_node(rng, depth + 1, height))
            .collect();
        Node::Function(op, children)
    }

    fn grow_node<R: Rng>(
        &self,
        rng: &mut R,
        depth: usize,
        min_height: usize,
        height: usize,
    ) -> Node {
        if depth >= height || (depth >= min_height && rng.gen_bool(self.p_leaf)) {
            return self.random_leaf(rng);
        }
        let op = self.function_set.random(rng);
        let children = (0..op.arity())
            .map(|_| self.grow_node(rng, depth + 1, min_height, height))
            .collect();
        Node::Function(op, children)
    }

    /// A random constant or feature reference
    pub fn random_leaf<R: Rng>(&self, rng: &mut R) -> Node {
        if self.n_features == 0 || rng.gen_bool(self.p_const) {
            Node::Constant(self.random_constant(rng))
        } else {
            Node::Terminal(rng.gen_range(0..self.n_features))
        }
    }

    fn random_constant<R: Rng>(&self, rng: &mut R) -> f64 {
        if self.const_min >= self.const_max {
            self.const_min
        } else {
            rng.gen_range(self.const_min..self.const_max)
        }
    }
}
