//! Recursive multi-step forecasting
//!
//! Each step feeds the model the current lag window, clamps the prediction
//! relative to the newest window value, then rolls the window forward.

use crate::error::{ForecastError, Result};
use crate::models::TrainedModel;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Per-step bound on a forecast relative to the preceding value.
///
/// The defaults (at most a 50% move either way per step) are an economic
/// sanity policy, not something estimated from data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClampPolicy {
    /// Lower multiplier of the preceding value
    pub lower: f64,
    /// Upper multiplier of the preceding value
    pub upper: f64,
}

impl Default for ClampPolicy {
    fn default() -> Self {
        Self {
            lower: 0.5,
            upper: 1.5,
        }
    }
}

impl ClampPolicy {
    /// Create a policy, requiring `0 <= lower <= 1 <= upper`
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        let policy = Self { lower, upper };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<()> {
        let ordered = self.lower >= 0.0 && self.lower <= 1.0 && self.upper >= 1.0;
        if !ordered || !self.upper.is_finite() {
            return Err(ForecastError::InvalidParameter(format!(
                "Clamp bounds must satisfy 0 <= lower <= 1 <= upper, got [{}, {}]",
                self.lower, self.upper
            )));
        }
        Ok(())
    }

    /// Bound `prediction` to `[lower * previous, upper * previous]`
    pub fn apply(&self, prediction: f64, previous: f64) -> f64 {
        let a = self.lower * previous;
        let b = self.upper * previous;
        // a negative previous value flips the interval
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prediction.max(lo).min(hi)
    }
}

/// Project `days` values past the end of `last_values`.
///
/// The window starts as the last `n_features` observed values; every step
/// appends its (clamped) prediction and drops the oldest value.
pub fn forecast_iteratively(
    model: &TrainedModel,
    last_values: &[f64],
    days: usize,
    clamp: &ClampPolicy,
) -> Result<Vec<f64>> {
    let nlags = model.n_features();
    if last_values.len() < nlags {
        return Err(ForecastError::DataError(format!(
            "Need the last {} values to seed the window, got {}",
            nlags,
            last_values.len()
        )));
    }

    let mut window: VecDeque<f64> = last_values[last_values.len() - nlags..]
        .iter()
        .copied()
        .collect();
    let mut row = Vec::with_capacity(nlags);
    let mut predictions = Vec::new();

    for _ in 0..days {
        row.clear();
        row.extend(window.iter().copied());

        let raw = model.predict_one(&row)?;
        let previous = window.back().copied().unwrap_or(raw);
        let next = clamp.apply(raw, previous);

        predictions.push(next);
        window.pop_front();
        window.push_back(next);
    }

    debug!(days, nlags, "iterative forecast complete");
    Ok(predictions)
}
