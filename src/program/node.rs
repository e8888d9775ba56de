//! Expression tree nodes
//!
//! Positions inside a tree are paths of child indices from the root; the
//! root itself is the empty path. Height counts edges, so a single leaf has
//! height 0.

use serde::{Deserialize, Serialize};

use super::op::Op;
use super::serialize::NodeRepr;
use crate::dataset::Dataset;

/// A node in an expression tree
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "NodeRepr", try_from = "NodeRepr")]
pub enum Node {
    /// Function node (internal)
    Function(Op, Vec<Node>),
    /// Feature reference (leaf)
    Terminal(usize),
    /// Numeric constant (leaf)
    Constant(f64),
}

impl Node {
    /// Create a function node
    pub fn function(op: Op, children: Vec<Node>) -> Self {
        Self::Function(op, children)
    }

    /// Create a feature reference
    pub fn terminal(feature: usize) -> Self {
        Self::Terminal(feature)
    }

    /// Create a constant
    pub fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    /// Check if this node has no children
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Self::Function(_, _))
    }

    /// Length of the longest root-to-leaf path, in edges
    pub fn height(&self) -> usize {
        match self {
            Self::Function(_, children) => {
                1 + children.iter().map(|c| c.height()).max().unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Number of nodes in this subtree
    pub fn size(&self) -> usize {
        match self {
            Self::Function(_, children) => 1 + children.iter().map(|c| c.size()).sum::<usize>(),
            _ => 1,
        }
    }

    /// All node positions, in preorder
    pub fn positions(&self) -> Vec<Vec<usize>> {
        let mut positions = Vec::new();
        self.collect_positions(&mut Vec::new(), &mut positions);
        positions
    }

    fn collect_positions(&self, path: &mut Vec<usize>, positions: &mut Vec<Vec<usize>>) {
        positions.push(path.clone());
        if let Self::Function(_, children) = self {
            for (i, child) in children.iter().enumerate() {
                path.push(i);
                child.collect_positions(path, positions);
                path.pop();
            }
        }
    }

    /// Subtree at the given path
    pub fn get_subtree(&self, path: &[usize]) -> Option<&Self> {
        match path.split_first() {
            None => Some(self),
            Some((&idx, rest)) => match self {
                Self::Function(_, children) => children.get(idx)?.get_subtree(rest),
                _ => None,
            },
        }
    }

    /// Mutable subtree at the given path
    pub fn get_subtree_mut(&mut self, path: &[usize]) -> Option<&mut Self> {
        match path.split_first() {
            None => Some(self),
            Some((&idx, rest)) => match self {
                Self::Function(_, children) => children.get_mut(idx)?.get_subtree_mut(rest),
                _ => None,
            },
        }
    }

    /// Replace the subtree at the given path, returning false if the path does not exist
    pub fn replace_subtree(&mut self, path: &[usize], new_subtree: Self) -> bool {
        match self.get_subtree_mut(path) {
            Some(slot) => {
                *slot = new_subtree;
                true
            }
            None => false,
        }
    }

    /// Number of constant leaves
    pub fn n_constants(&self) -> usize {
        match self {
            Self::Function(_, children) => children.iter().map(|c| c.n_constants()).sum(),
            Self::Constant(_) => 1,
            Self::Terminal(_) => 0,
        }
    }

    /// Visit every constant value mutably, in preorder
    pub fn for_each_constant_mut<F: FnMut(&mut f64)>(&mut self, f: &mut F) {
        match self {
            Self::Function(_, children) => {
                for child in children {
                    child.for_each_constant_mut(f);
                }
            }
            Self::Constant(value) => f(value),
            Self::Terminal(_) => {}
        }
    }

    /// Highest feature index referenced, if any
    pub fn max_feature(&self) -> Option<usize> {
        match self {
            Self::Function(_, children) => children.iter().filter_map(|c| c.max_feature()).max(),
            Self::Terminal(feature) => Some(*feature),
            Self::Constant(_) => None,
        }
    }

    /// Rewrite feature `i` to `mapping[i]`
    pub fn remap_features(&mut self, mapping: &[usize]) {
        match self {
            Self::Function(_, children) => {
                for child in children {
                    child.remap_features(mapping);
                }
            }
            Self::Terminal(feature) => *feature = mapping[*feature],
            Self::Constant(_) => {}
        }
    }

    /// Evaluate over every row of a dataset, one output per row
    pub fn evaluate(&self, dataset: &Dataset) -> Vec<f64> {
        match self {
            Self::Function(op, children) => {
                let args: Vec<Vec<f64>> = children.iter().map(|c| c.evaluate(dataset)).collect();
                op.apply_columns(&args)
            }
            Self::Terminal(feature) => dataset.column(*feature).to_vec(),
            Self::Constant(value) => vec![*value; dataset.n_rows()],
        }
    }

    /// Evaluate on a single row of feature values
    ///
    /// Panics if the tree references a feature past the end of `row`.
    pub fn evaluate_row(&self, row: &[f64]) -> f64 {
        match self {
            Self::Function(op, children) => {
                let args: Vec<f64> = children.iter().map(|c| c.evaluate_row(row)).collect();
                op.apply(&args)
            }
            Self::Terminal(feature) => row[*feature],
            Self::Constant(value) => *value,
        }
    }
}
