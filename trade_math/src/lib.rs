//! # Trade Math
//!
//! Numeric helpers shared by the forecasting engine.
//! This crate provides summary statistics used when growing regression
//! trees and the error metrics used to score walk-forward backtests.

use thiserror::Error;

pub mod accuracy;
pub mod statistics;

pub use accuracy::{direction_accuracy, mean_absolute_error, root_mean_squared_error};
pub use statistics::{mean, variance};

/// Errors that can occur in trading-related calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;
