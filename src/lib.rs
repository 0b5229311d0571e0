//! # Lag Forecast Workspace
//!
//! Umbrella crate over the workspace members:
//!
//! - [`lag_forecast`]: lag-window features, random forest regression,
//!   walk-forward backtesting and clamped iterative forecasting
//! - [`trade_math`]: error metrics and running statistics shared by the
//!   forecaster
//!
//! ## Example
//!
//! ```
//! use lag_forecast_workspace::lag_forecast::{forecast, ForecastConfig, PriceSeries};
//!
//! let series = PriceSeries::new(vec![100.0; 30]);
//! let bundle = forecast(&series, &ForecastConfig::new().with_days(2)).unwrap();
//! assert_eq!(bundle.forecast, vec![100.0, 100.0]);
//! ```

pub use lag_forecast;
pub use trade_math;
