//! Tabular training data
//!
//! Features are stored column-major so that programs can be evaluated one
//! node at a time over every row.

use rand::seq::index::sample;
use rand::Rng;

use crate::error::{GpError, GpResult};

/// Feature matrix, target vector and optional per-row weights
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    columns: Vec<Vec<f64>>,
    y: Vec<f64>,
    w: Option<Vec<f64>>,
}

impl Dataset {
    /// Create a dataset from feature columns (`columns[feature][row]`)
    ///
    /// An empty weight vector is treated as "no weights".
    pub fn from_columns(
        columns: Vec<Vec<f64>>,
        y: Vec<f64>,
        w: Option<Vec<f64>>,
    ) -> GpResult<Self> {
        if columns.is_empty() || y.is_empty() {
            return Err(GpError::EmptyDataset);
        }
        let n_rows = y.len();
        if let Some(bad) = columns.iter().position(|c| c.len() != n_rows) {
            return Err(GpError::InvalidConfiguration(format!(
                "feature {} has {} rows, target has {}",
                bad,
                columns[bad].len(),
                n_rows
            )));
        }

        let w = w.filter(|w| !w.is_empty());
        if let Some(w) = &w {
            if w.len() != n_rows {
                return Err(GpError::InvalidConfiguration(format!(
                    "{} weights for {} rows",
                    w.len(),
                    n_rows
                )));
            }
            if w.iter().any(|&wi| wi < 0.0 || !wi.is_finite()) {
                return Err(GpError::InvalidConfiguration(
                    "weights must be finite and non-negative".to_string(),
                ));
            }
        }

        Ok(Self { columns, y, w })
    }

    /// Create a dataset from row-major features (`rows[row][feature]`)
    pub fn from_rows(rows: &[Vec<f64>], y: Vec<f64>, w: Option<Vec<f64>>) -> GpResult<Self> {
        let n_features = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.iter().any(|r| r.len() != n_features) {
            return Err(GpError::InvalidConfiguration(
                "rows have differing numbers of features".to_string(),
            ));
        }
        if rows.len() != y.len() {
            return Err(GpError::InvalidConfiguration(format!(
                "{} rows for {} targets",
                rows.len(),
                y.len()
            )));
        }
        let columns = (0..n_features)
            .map(|j| rows.iter().map(|r| r[j]).collect())
            .collect();
        Self::from_columns(columns, y, w)
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.y.len()
    }

    /// Number of features
    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    /// Values of a single feature across all rows
    pub fn column(&self, feature: usize) -> &[f64] {
        &self.columns[feature]
    }

    /// All feature columns
    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    /// Feature values of a single row
    pub fn row(&self, row: usize) -> Vec<f64> {
        self.columns.iter().map(|c| c[row]).collect()
    }

    /// Target values
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Per-row weights, if any
    pub fn weights(&self) -> Option<&[f64]> {
        self.w.as_deref()
    }

    /// Same features and weights with a different target
    pub fn with_target(&self, y: Vec<f64>) -> GpResult<Self> {
        Self::from_columns(self.columns.clone(), y, self.w.clone())
    }

    /// Restrict to the given rows and feature columns, in the given order
    pub fn subset(&self, rows: &[usize], features: &[usize]) -> GpResult<Self> {
        let columns = features
            .iter()
            .map(|&f| rows.iter().map(|&r| self.columns[f][r]).collect())
            .collect();
        let y = rows.iter().map(|&r| self.y[r]).collect();
        let w = self
            .w
            .as_ref()
            .map(|w| rows.iter().map(|&r| w[r]).collect());
        Self::from_columns(columns, y, w)
    }
}

/// Sample `ceil(fraction * n)` distinct indices (at least one), returned sorted
pub fn sample_indices<R: Rng>(n: usize, fraction: f64, rng: &mut R) -> Vec<usize> {
    if fraction >= 1.0 {
        return (0..n).collect();
    }
    let amount = ((n as f64) * fraction).ceil().clamp(1.0, n as f64) as usize;
    let mut indices = sample(rng, n, amount).into_vec();
    indices.sort_unstable();
    indices
}
