//! Fitted models and the top-level fit entry point

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::algorithms::boosting::{Booster, Ensemble};
use crate::algorithms::estimator::GpEstimator;
use crate::config::FitConfig;
use crate::dataset::Dataset;
use crate::error::{GpError, GpResult};
use crate::metrics::sigmoid;
use crate::program::Program;

/// How programs are combined into a model
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flavor {
    /// A single evolved program
    Vanilla,
    /// A gradient-boosted ensemble of programs
    Boosting,
}

impl FromStr for Flavor {
    type Err = GpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vanilla" => Ok(Flavor::Vanilla),
            "boosting" => Ok(Flavor::Boosting),
            _ => Err(GpError::UnknownFlavor(s.to_string())),
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flavor::Vanilla => write!(f, "vanilla"),
            Flavor::Boosting => write!(f, "boosting"),
        }
    }
}

/// A fitted model
///
/// Serializes as the bare program or ensemble JSON; the two shapes are
/// told apart when reading back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    Program(Program),
    Ensemble(Ensemble),
}

impl Model {
    /// Raw predictions for every row
    pub fn predict(&self, dataset: &Dataset) -> GpResult<Vec<f64>> {
        match self {
            Model::Program(program) => program.predict(dataset),
            Model::Ensemble(ensemble) => ensemble.predict(dataset),
        }
    }

    /// Predictions read as log-odds and mapped to probabilities
    pub fn predict_proba(&self, dataset: &Dataset) -> GpResult<Vec<f64>> {
        Ok(self.predict(dataset)?.into_iter().map(sigmoid).collect())
    }

    pub fn flavor(&self) -> Flavor {
        match self {
            Model::Program(_) => Flavor::Vanilla,
            Model::Ensemble(_) => Flavor::Boosting,
        }
    }

    pub fn to_json(&self) -> GpResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> GpResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Program(program) => write!(f, "{}", program),
            Model::Ensemble(ensemble) => write!(f, "{}", ensemble),
        }
    }
}

/// Fit a model as described by `config`
///
/// Only the settings relevant to the chosen flavor are validated.
pub fn fit(config: &FitConfig, train: &Dataset, val: Option<&Dataset>) -> GpResult<Model> {
    config.check_unknown()?;
    match config.flavor.parse::<Flavor>()? {
        Flavor::Vanilla => {
            let mut estimator = GpEstimator::new(config.gp.clone())?;
            Ok(Model::Program(estimator.fit(train, val)?))
        }
        Flavor::Boosting => {
            let mut booster = Booster::new(config.gp.clone(), config.boosting.clone())?;
            Ok(Model::Ensemble(booster.fit(train, val)?.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flavor_parse() {
        assert_eq!("vanilla".parse::<Flavor>().unwrap(), Flavor::Vanilla);
        assert_eq!(" Boosting".parse::<Flavor>().unwrap(), Flavor::Boosting);
        assert!(matches!(
            "bagging".parse::<Flavor>(),
            Err(GpError::UnknownFlavor(_))
        ));
        assert_eq!(Flavor::Boosting.to_string(), "boosting");
    }

    #[test]
    fn test_model_json_distinguishes_shapes() {
        let program: Program = "add(x0, 1.5)".parse().unwrap();
        let model = Model::Program(program.clone());
        let back = Model::from_json(&model.to_json().unwrap()).unwrap();
        assert_eq!(back, model);
        assert_eq!(back.flavor(), Flavor::Vanilla);

        let mut ensemble = Ensemble::new(0.25);
        ensemble.push(program, 0.1);
        let model = Model::Ensemble(ensemble);
        let back = Model::from_json(&model.to_json().unwrap()).unwrap();
        assert_eq!(back, model);
        assert_eq!(back.flavor(), Flavor::Boosting);
    }

    #[test]
    fn test_predict_proba() {
        let ds = Dataset::from_rows(&[vec![0.0], vec![100.0]], vec![0.0, 1.0], None).unwrap();
        let model = Model::Program("x0".parse().unwrap());
        let proba = model.predict_proba(&ds).unwrap();
        assert_eq!(proba[0], 0.5);
        assert!(proba[1] > 0.999);
    }

    #[test]
    fn test_fit_unknown_flavor() {
        let ds = Dataset::from_rows(&[vec![0.0], vec![1.0]], vec![0.0, 1.0], None).unwrap();
        let config = FitConfig {
            flavor: "forest".to_string(),
            ..FitConfig::default()
        };
        assert!(matches!(
            fit(&config, &ds, None),
            Err(GpError::UnknownFlavor(_))
        ));
    }

    #[test]
    fn test_fit_rejects_unknown_options() {
        let ds = Dataset::from_rows(&[vec![0.0], vec![1.0]], vec![0.0, 1.0], None).unwrap();
        let mut config = FitConfig::default();
        config
            .unknown
            .insert("n_generation".to_string(), serde_json::json!(5));
        assert!(matches!(
            fit(&config, &ds, None),
            Err(GpError::InvalidConfiguration(_))
        ));
    }
}
