//! Error types for the lag_forecast crate

use polars::prelude::PolarsError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Custom error types for the lag_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Fewer observations than the lag window needs
    #[error("Insufficient history: need at least {required} observations, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    /// Input that no model can be fitted on (non-finite values, empty tables)
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// Error while fitting or evaluating a model
    #[error("Model error: {0}")]
    ModelError(String),

    /// Error from the on-disk model cache
    #[error("Cache error: {0}")]
    CacheError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from JSON (de)serialization
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Error from numeric helpers
    #[error("Math error: {0}")]
    MathError(#[from] trade_math::MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

/// Coarse classification of why no forecast was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    /// Series shorter than `nlags + 10`
    InsufficientHistory,
    /// Training or prediction failed
    FitFailure,
    /// Input values or tables that cannot be modelled
    DegenerateInput,
    /// Input that could not be read or parsed
    DataUnavailable,
    /// Rejected configuration
    InvalidConfig,
    /// Model cache could not be used
    Cache,
}

impl ForecastError {
    /// Map the error onto the reason a caller should branch on
    pub fn reason(&self) -> FailureReason {
        match self {
            ForecastError::InsufficientHistory { .. } => FailureReason::InsufficientHistory,
            ForecastError::DegenerateInput(_) | ForecastError::DataError(_) => {
                FailureReason::DegenerateInput
            }
            ForecastError::IoError(_) | ForecastError::PolarsError(_) => {
                FailureReason::DataUnavailable
            }
            ForecastError::InvalidParameter(_) | ForecastError::SerializationError(_) => {
                FailureReason::InvalidConfig
            }
            ForecastError::CacheError(_) => FailureReason::Cache,
            ForecastError::ModelError(_) | ForecastError::MathError(_) => {
                FailureReason::FitFailure
            }
        }
    }
}
