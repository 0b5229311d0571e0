//! Forecast run configuration

use crate::error::{ForecastError, Result};
use crate::forecaster::ClampPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Observations required beyond the lag window before forecasting
pub const MIN_EXTRA_HISTORY: usize = 10;

/// Longest horizon a single run will project
pub const MAX_FORECAST_DAYS: usize = 10_000;

/// Parameters of one forecast run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Forecast horizon in steps
    pub days: usize,
    /// Lag window width
    pub nlags: usize,
    /// Fraction of feature rows held out by the backtest
    pub test_size: f64,
    /// Model family token, e.g. "rf"
    pub model_family: String,
    /// Ignore any cached model and overwrite it
    pub retrain: bool,
    /// Directory of the model cache; no caching when unset
    pub cache_dir: Option<PathBuf>,
    /// Per-step clamp applied by the iterative forecaster
    pub clamp: ClampPolicy,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            days: 7,
            nlags: 10,
            test_size: 0.2,
            model_family: "rf".to_string(),
            retrain: false,
            cache_dir: None,
            clamp: ClampPolicy::default(),
        }
    }
}

impl ForecastConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_days(mut self, days: usize) -> Self {
        self.days = days;
        self
    }

    pub fn with_nlags(mut self, nlags: usize) -> Self {
        self.nlags = nlags;
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_model_family(mut self, family: impl Into<String>) -> Self {
        self.model_family = family.into();
        self
    }

    pub fn with_retrain(mut self, retrain: bool) -> Self {
        self.retrain = retrain;
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn with_clamp(mut self, clamp: ClampPolicy) -> Self {
        self.clamp = clamp;
        self
    }

    /// Smallest series length a forecast can be made from
    pub fn min_history(&self) -> usize {
        self.nlags.saturating_add(MIN_EXTRA_HISTORY)
    }

    /// Reject parameters no run could use
    pub fn validate(&self) -> Result<()> {
        if self.nlags == 0 {
            return Err(ForecastError::InvalidParameter(
                "Number of lags must be positive".to_string(),
            ));
        }
        if self.nlags.checked_add(MIN_EXTRA_HISTORY).is_none() {
            return Err(ForecastError::InvalidParameter(format!(
                "Number of lags is too large: {}",
                self.nlags
            )));
        }
        if self.days > MAX_FORECAST_DAYS {
            return Err(ForecastError::InvalidParameter(format!(
                "Forecast horizon must be at most {} steps, got {}",
                MAX_FORECAST_DAYS, self.days
            )));
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Test size must be between 0 and 1, got {}",
                self.test_size
            )));
        }
        self.clamp.validate()
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
