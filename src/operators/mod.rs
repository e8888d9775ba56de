//! Genetic operators
//!
//! This module provides selection, crossover and mutation operators over
//! programs, and the [`Breeder`](reproduction::Breeder) that combines them
//! into a generational step.

pub mod crossover;
pub mod mutation;
pub mod reproduction;
pub mod selection;
pub mod traits;

pub mod prelude {
    pub use super::crossover::*;
    pub use super::mutation::*;
    pub use super::reproduction::*;
    pub use super::selection::*;
    pub use super::traits::*;
}
