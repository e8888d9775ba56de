//! Error types for xgp-evo
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Error type for operator failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperatorError {
    /// Crossover could not produce a child within the height bounds
    #[error("Crossover failed: {0}")]
    CrossoverFailed(String),

    /// Mutation could not produce a program within the height bounds
    #[error("Mutation failed: {0}")]
    MutationFailed(String),
}

/// Top-level error type for fitting and serialization
#[derive(Debug, Error)]
pub enum GpError {
    /// Metric name not recognized
    #[error("Unknown metric: '{0}'")]
    UnknownMetric(String),

    /// Boosting requires a loss metric with a gradient
    #[error("Metric '{0}' is not differentiable and cannot drive boosting")]
    NonDifferentiableMetric(String),

    /// Ensemble flavor not recognized
    #[error("Unknown flavor: '{0}'")]
    UnknownFlavor(String),

    /// Function name not recognized in a function set or a serialized program
    #[error("Unknown function: '{0}'")]
    UnknownFunction(String),

    /// Inconsistent hyperparameters
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Dataset without rows or features
    #[error("Empty dataset")]
    EmptyDataset,

    /// Every island ended up without an evaluated individual
    #[error("Empty population")]
    EmptyPopulation,

    /// Malformed program text
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration failure
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error while loading configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for fitting operations
pub type GpResult<T> = Result<T, GpError>;

/// Result of an operator application
#[derive(Debug, Clone)]
pub enum OperatorResult<G> {
    /// Operation succeeded
    Success(G),
    /// Operation failed unrecoverably; the caller keeps the original
    Failed(OperatorError),
}

impl<G> OperatorResult<G> {
    /// Returns the value if successful, None if failed
    pub fn ok(self) -> Option<G> {
        match self {
            Self::Success(g) => Some(g),
            Self::Failed(_) => None,
        }
    }

    /// Returns true if the operation was successful
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the value, or the supplied fallback when the operation failed
    pub fn unwrap_or_else<F: FnOnce(OperatorError) -> G>(self, fallback: F) -> G {
        match self {
            Self::Success(g) => g,
            Self::Failed(e) => fallback(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gp_error_display() {
        let err = GpError::UnknownMetric("foo".to_string());
        assert_eq!(err.to_string(), "Unknown metric: 'foo'");

        let err = GpError::NonDifferentiableMetric("accuracy".to_string());
        assert_eq!(
            err.to_string(),
            "Metric 'accuracy' is not differentiable and cannot drive boosting"
        );

        let err = GpError::InvalidConfiguration("min_height > max_height".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: min_height > max_height"
        );
    }

    #[test]
    fn test_operator_error_display() {
        let err = OperatorError::CrossoverFailed("height 9 exceeds 5".to_string());
        assert_eq!(err.to_string(), "Crossover failed: height 9 exceeds 5");
    }

    #[test]
    fn test_gp_error_from_json_error() {
        let json_err = serde_json::from_str::<f64>("not json").unwrap_err();
        let err: GpError = json_err.into();
        assert!(matches!(err, GpError::Json(_)));
    }

    #[test]
    fn test_operator_result_success() {
        let result: OperatorResult<i32> = OperatorResult::Success(42);
        assert!(result.is_ok());
        assert_eq!(result.ok(), Some(42));
    }

    #[test]
    fn test_operator_result_failed() {
        let result: OperatorResult<i32> =
            OperatorResult::Failed(OperatorError::MutationFailed("test".to_string()));
        assert!(!result.is_ok());
        assert_eq!(result.unwrap_or_else(|_| 7), 7);
    }
}
