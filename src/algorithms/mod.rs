//! Search algorithms
//!
//! The island model and the genetic programming estimator built on it, plus
//! the gradient boosting meta-estimator that chains estimators together.

pub mod boosting;
pub mod early_stopping;
pub mod estimator;
pub mod island;
pub mod line_search;

pub mod prelude {
    pub use super::boosting::{Booster, Ensemble, WeakLearner};
    pub use super::early_stopping::EarlyStopping;
    pub use super::estimator::GpEstimator;
    pub use super::island::{Island, IslandModel, IslandState};
    pub use super::line_search::golden_section;
}
