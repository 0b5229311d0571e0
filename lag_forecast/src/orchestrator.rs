//! End-to-end forecast runs
//!
//! [`forecast`] composes the pipeline and reports typed failures;
//! [`train_and_forecast`] is the boundary for callers that only want to know
//! whether a forecast is available.

use crate::backtest::{backtest_model, BacktestMetrics, BacktestReport};
use crate::cache::{CacheKey, ModelCache};
use crate::config::ForecastConfig;
use crate::data::PriceSeries;
use crate::error::{FailureReason, ForecastError, Result};
use crate::features::{build_lag_features, LagTable};
use crate::forecaster::forecast_iteratively;
use crate::models::{train_model, FamilySelection, ModelFamily, TrainedModel};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Everything a successful run produces
#[derive(Debug, Clone)]
pub struct ForecastBundle {
    /// Model fitted on every feature row, used for the forecast
    pub model: TrainedModel,
    /// Exactly `days` projected values
    pub forecast: Vec<f64>,
    /// Walk-forward metrics and the prefix-trained model
    pub backtest: BacktestReport,
    /// Timestamps of the forecast steps when the series is time-indexed
    pub timestamps: Option<Vec<DateTime<Utc>>>,
    /// Whether `model` came from the model cache
    pub from_cache: bool,
}

/// Result of [`train_and_forecast`]: either all parts or none of them
#[derive(Debug, Clone, Default)]
pub struct ForecastOutcome {
    pub model: Option<TrainedModel>,
    pub forecast: Option<Vec<f64>>,
    pub backtest: Option<BacktestMetrics>,
    /// Why the outcome is empty
    pub failure: Option<FailureReason>,
}

impl ForecastOutcome {
    fn unavailable(reason: FailureReason) -> Self {
        Self {
            failure: Some(reason),
            ..Default::default()
        }
    }

    /// True when no forecast is available
    pub fn is_empty(&self) -> bool {
        self.forecast.is_none()
    }

    pub fn into_parts(
        self,
    ) -> (
        Option<TrainedModel>,
        Option<Vec<f64>>,
        Option<BacktestMetrics>,
    ) {
        (self.model, self.forecast, self.backtest)
    }
}

impl From<ForecastBundle> for ForecastOutcome {
    fn from(bundle: ForecastBundle) -> Self {
        Self {
            model: Some(bundle.model),
            forecast: Some(bundle.forecast),
            backtest: Some(bundle.backtest.metrics),
            failure: None,
        }
    }
}

/// Backtest, retrain on full history and forecast `config.days` steps.
pub fn forecast(series: &PriceSeries, config: &ForecastConfig) -> Result<ForecastBundle> {
    config.validate()?;

    let prices = series.values();
    if let Some(idx) = prices.iter().position(|p| !p.is_finite()) {
        return Err(ForecastError::DegenerateInput(format!(
            "Non-finite price {} at position {}",
            prices[idx], idx
        )));
    }

    let required = config.min_history();
    if prices.len() < required {
        return Err(ForecastError::InsufficientHistory {
            required,
            actual: prices.len(),
        });
    }

    let selection = ModelFamily::select(&config.model_family);
    let table = build_lag_features(prices, config.nlags)?;

    let backtest = backtest_model(&table, config.test_size, &selection)?;
    let (model, from_cache) = fit_full_model(prices, &table, &selection, config)?;

    let forecast = forecast_iteratively(
        &model,
        series.tail(config.nlags),
        config.days,
        &config.clamp,
    )?;

    info!(
        observations = prices.len(),
        days = config.days,
        rmse = backtest.metrics.rmse,
        direction_accuracy = backtest.metrics.direction_accuracy,
        from_cache,
        "forecast complete"
    );

    Ok(ForecastBundle {
        model,
        forecast,
        backtest,
        timestamps: series.future_timestamps(config.days),
        from_cache,
    })
}

/// Run [`forecast`], turning every failure into an empty outcome.
pub fn train_and_forecast(series: &PriceSeries, config: &ForecastConfig) -> ForecastOutcome {
    match forecast(series, config) {
        Ok(bundle) => bundle.into(),
        Err(err) => {
            let reason = err.reason();
            warn!(error = %err, ?reason, "forecast unavailable");
            ForecastOutcome::unavailable(reason)
        }
    }
}

/// Model over every feature row, from the cache when allowed
fn fit_full_model(
    prices: &[f64],
    table: &LagTable,
    selection: &FamilySelection,
    config: &ForecastConfig,
) -> Result<(TrainedModel, bool)> {
    let cache = match &config.cache_dir {
        Some(dir) => match ModelCache::new(dir) {
            Ok(cache) => Some(cache),
            Err(err) => {
                warn!(error = %err, "model cache unavailable, training without it");
                None
            }
        },
        None => None,
    };

    let Some(cache) = cache else {
        return Ok((train_model(table, selection)?, false));
    };

    let key = CacheKey::new(prices, config.nlags, selection.resolved);
    if !config.retrain {
        if let Some(model) = cache.load(&key) {
            return Ok((model.reselected(selection), true));
        }
    }

    let model = train_model(table, selection)?;
    if let Err(err) = cache.store(&key, &model) {
        warn!(error = %err, "failed to cache trained model");
    }
    Ok((model, false))
}
