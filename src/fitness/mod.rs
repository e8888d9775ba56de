//! Fitness evaluation
//!
//! This module provides the fitness abstraction and the loss-based evaluator
//! used by the estimators.

pub mod loss;
pub mod traits;

pub mod prelude {
    pub use super::loss::*;
    pub use super::traits::*;
}
