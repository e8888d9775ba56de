//! Programs: executable expression trees
//!
//! A [`Program`] wraps a root [`Node`]. Programs evaluate column-wise over a
//! [`Dataset`], and serialize either to a compact text form
//! (`add(x0, mul(1.5, x1))`) or to a tagged JSON form.

pub mod generate;
pub mod node;
pub mod op;
mod serialize;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{GpError, GpResult};

pub use generate::TreeGenerator;
pub use node::Node;
pub use op::{FunctionSet, Op};

/// An expression tree that maps feature rows to predictions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Program {
    root: Node,
}

impl Program {
    /// Wrap a root node
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Root node
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Mutable root node
    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// Height in edges
    pub fn height(&self) -> usize {
        self.root.height()
    }

    /// Number of nodes
    pub fn size(&self) -> usize {
        self.root.size()
    }

    /// Predictions for every row; the dataset must have every referenced feature
    pub fn evaluate(&self, dataset: &Dataset) -> Vec<f64> {
        self.root.evaluate(dataset)
    }

    /// Prediction for a single row of feature values
    ///
    /// Panics if the program references a feature past the end of `row`;
    /// [`Program::predict_row`] checks first.
    pub fn evaluate_row(&self, row: &[f64]) -> f64 {
        self.root.evaluate_row(row)
    }

    /// Prediction for a single row, checking that referenced features exist
    pub fn predict_row(&self, row: &[f64]) -> GpResult<f64> {
        self.check_features(row.len())?;
        Ok(self.evaluate_row(row))
    }

    /// Predictions for every row, checking that referenced features exist
    pub fn predict(&self, dataset: &Dataset) -> GpResult<Vec<f64>> {
        self.check_features(dataset.n_features())?;
        Ok(self.evaluate(dataset))
    }

    /// Fail unless every referenced feature index is below `n_features`
    pub fn check_features(&self, n_features: usize) -> GpResult<()> {
        match self.root.max_feature() {
            Some(feature) if feature >= n_features => Err(GpError::InvalidConfiguration(format!(
                "program references feature x{} but the dataset has {} features",
                feature, n_features
            ))),
            _ => Ok(()),
        }
    }

    /// Rewrite feature `i` to `mapping[i]`
    pub fn remap_features(&mut self, mapping: &[usize]) {
        self.root.remap_features(mapping);
    }

    /// JSON form; fails when a constant is not finite
    pub fn to_json(&self) -> GpResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the JSON form
    pub fn from_json(json: &str) -> GpResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<Node> for Program {
    fn from(root: Node) -> Self {
        Self::new(root)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

impl FromStr for Program {
    type Err = GpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.parse()?))
    }
}

pub mod prelude {
    pub use super::{FunctionSet, Node, Op, Program, TreeGenerator};
}
