//! # xgp-evo
//!
//! Symbolic regression through genetic programming, with gradient boosting
//! of evolved programs.
//!
//! Given a tabular dataset and a loss metric, the library evolves small
//! expression trees ("programs") that predict the target, using independent
//! islands of tournament-selected populations. Programs can also be chained
//! into a gradient-boosted ensemble, each round fitting the pseudo-residuals
//! of the ensemble so far.
//!
//! ## Core Concepts
//!
//! - **Programs**: closed tagged trees of operators, features and constants,
//!   evaluated column-wise over a [`Dataset`](dataset::Dataset)
//! - **Fitness**: the loss metric plus a parsimony penalty per node, minimised
//! - **Metrics**: every metric can score; differentiable ones can also drive
//!   boosting
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use xgp_evo::prelude::*;
//!
//! let train = Dataset::from_rows(&rows, y, None)?;
//! let config = FitConfig {
//!     gp: GpConfig::new().funcs("add,sub,mul").generations(50).seed(42),
//!     ..FitConfig::default()
//! };
//! let model = fit(&config, &train, None)?;
//! println!("{}", model);
//! ```

pub mod algorithms;
pub mod config;
pub mod dataset;
pub mod diagnostics;
pub mod error;
pub mod fitness;
pub mod metrics;
pub mod model;
pub mod operators;
pub mod population;
pub mod program;
pub mod termination;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::config::{BoostingConfig, FitConfig, GpConfig};
    pub use crate::dataset::Dataset;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::fitness::prelude::*;
    pub use crate::metrics::{metric_from_name, DifferentiableMetric, Metric};
    pub use crate::model::{fit, Flavor, Model};
    pub use crate::operators::prelude::*;
    pub use crate::population::prelude::*;
    pub use crate::program::prelude::*;
    pub use crate::termination::prelude::*;
}
