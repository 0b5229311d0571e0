//! # Lag Forecast
//!
//! Short-horizon price forecasting from fixed-width lag windows, with a
//! walk-forward backtest of how reliable the forecast has been.
//!
//! ## Pipeline
//!
//! - **Features**: each row holds `nlags` consecutive prices; its target is
//!   the price two steps after the window
//! - **Models**: a seeded, single-threaded random forest regressor; other
//!   family tokens fall back to it
//! - **Backtest**: one chronological train/test split scored by RMSE, MAE
//!   and direction accuracy
//! - **Forecast**: recursive one-step predictions, each clamped to within
//!   50% of the value before it
//! - **Cache**: optional on-disk store of fully trained models
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lag_forecast::{forecast, ForecastConfig, PriceSeries};
//!
//! let prices: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.1).sin()).collect();
//! let series = PriceSeries::new(prices);
//!
//! let config = ForecastConfig::new().with_days(5).with_nlags(10);
//! let bundle = forecast(&series, &config)?;
//!
//! println!("{:?}", bundle.forecast);
//! println!("{}", bundle.backtest);
//! # Ok::<(), lag_forecast::ForecastError>(())
//! ```

pub mod backtest;
pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod forecaster;
pub mod models;
pub mod orchestrator;

// Re-export commonly used types
pub use crate::backtest::{backtest_model, BacktestMetrics, BacktestReport};
pub use crate::cache::{CacheKey, ModelCache};
pub use crate::config::ForecastConfig;
pub use crate::data::{DataLoader, PriceSeries};
pub use crate::error::{FailureReason, ForecastError};
pub use crate::features::{build_lag_features, LagTable};
pub use crate::forecaster::{forecast_iteratively, ClampPolicy};
pub use crate::models::{train_model, FamilySelection, ModelFamily, Regressor, TrainedModel};
pub use crate::orchestrator::{forecast, train_and_forecast, ForecastBundle, ForecastOutcome};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
