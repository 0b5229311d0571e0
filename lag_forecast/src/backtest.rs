//! Walk-forward backtesting on a single chronological split

use crate::error::{ForecastError, Result};
use crate::features::LagTable;
use crate::models::{train_model, FamilySelection, TrainedModel};
use serde::{Deserialize, Serialize};
use tracing::debug;
use trade_math::accuracy::{direction_accuracy, mean_absolute_error, root_mean_squared_error};

/// Metrics from one walk-forward backtest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestMetrics {
    /// Root mean squared error, in price units
    pub rmse: f64,
    /// Mean absolute error, in price units
    pub mae: f64,
    /// Share of consecutive moves whose direction was predicted correctly
    pub direction_accuracy: f64,
    /// Rows held out for evaluation
    pub test_periods: usize,
    /// Rows used for training
    pub train_size: usize,
}

/// Backtest metrics plus the model trained on the prefix
#[derive(Debug, Clone)]
pub struct BacktestReport {
    pub metrics: BacktestMetrics,
    /// Model fitted on the first `train_size` rows only
    pub model: TrainedModel,
}

/// Rows held out for a table of `rows` rows at fraction `test_size`
pub fn test_periods_for(rows: usize, test_size: f64) -> usize {
    ((rows as f64 * test_size).floor() as usize).max(1)
}

/// Train on the chronological prefix of `table` and score the suffix.
///
/// `test_periods = max(1, floor(rows * test_size))`; rows are never shuffled.
pub fn backtest_model(
    table: &LagTable,
    test_size: f64,
    selection: &FamilySelection,
) -> Result<BacktestReport> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "Test size must be between 0 and 1, got {}",
            test_size
        )));
    }

    let rows = table.len();
    let test_periods = test_periods_for(rows, test_size);
    if test_periods >= rows {
        return Err(ForecastError::DegenerateInput(format!(
            "A table of {} rows leaves nothing to train on",
            rows
        )));
    }
    let train_size = rows - test_periods;

    let (train, test) = table.split_at(train_size);
    debug!(train_size, test_periods, "backtest split");

    let model = train_model(&train, selection)?;
    let predicted = model.predict(test.features())?;
    let actual = test.targets();

    let metrics = BacktestMetrics {
        rmse: root_mean_squared_error(&predicted, actual)?,
        mae: mean_absolute_error(&predicted, actual)?,
        direction_accuracy: direction_accuracy(&predicted, actual)?,
        test_periods,
        train_size,
    };

    Ok(BacktestReport { metrics, model })
}

impl std::fmt::Display for BacktestMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Backtest Metrics:")?;
        writeln!(f, "  RMSE:      {:.4}", self.rmse)?;
        writeln!(f, "  MAE:       {:.4}", self.mae)?;
        writeln!(f, "  Direction: {:.2}%", self.direction_accuracy * 100.0)?;
        writeln!(f, "  Test/Train: {}/{}", self.test_periods, self.train_size)?;
        Ok(())
    }
}

impl std::fmt::Display for BacktestReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.metrics.fmt(f)
    }
}
