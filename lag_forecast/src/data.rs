//! Price series handling for forecasting

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Ordered price observations with an optional timestamp index.
///
/// Only the values feed the models; the index is informational and is used
/// to stamp forecast steps.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    values: Vec<f64>,
    timestamps: Option<Vec<DateTime<Utc>>>,
}

/// Data loader for price series
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a price series from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<PriceSeries> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(&df)
    }

    /// Extract the close prices (and timestamps, when present) of a DataFrame.
    ///
    /// Rows with a null close are dropped.
    pub fn from_dataframe(df: &DataFrame) -> Result<PriceSeries> {
        let close_column = Self::detect_close_column(df)?;
        let closes = df.column(&close_column)?.cast(&DataType::Float64)?;
        let closes = closes.f64()?;

        let timestamps = match Self::detect_time_column(df) {
            Some(name) => Self::column_timestamps(df.column(&name)?),
            None => None,
        };

        let mut values = Vec::with_capacity(closes.len());
        let mut kept_timestamps = Vec::with_capacity(closes.len());
        for (idx, close) in closes.into_iter().enumerate() {
            if let Some(close) = close {
                values.push(close);
                if let Some(ts) = timestamps.as_ref().and_then(|t| t.get(idx)) {
                    kept_timestamps.push(*ts);
                }
            }
        }

        if values.is_empty() {
            return Err(ForecastError::DataError(format!(
                "Column '{}' has no usable prices",
                close_column
            )));
        }

        match timestamps {
            Some(_) if kept_timestamps.len() == values.len() => {
                PriceSeries::with_timestamps(kept_timestamps, values)
            }
            _ => Ok(PriceSeries::new(values)),
        }
    }

    /// Find the close column, falling back to a generic price column
    fn detect_close_column(df: &DataFrame) -> Result<String> {
        let column_names = df.get_column_names();

        for keyword in ["close", "price"] {
            if let Some(name) = column_names
                .iter()
                .find(|name| name.to_lowercase().contains(keyword))
            {
                return Ok(name.to_string());
            }
        }

        Err(ForecastError::DataError(
            "No close or price column found in data".to_string(),
        ))
    }

    fn detect_time_column(df: &DataFrame) -> Option<String> {
        df.get_column_names()
            .into_iter()
            .find(|name| {
                let lower = name.to_lowercase();
                lower.contains("date") || lower.contains("time")
            })
            .map(str::to_string)
    }

    /// Convert a time column to UTC timestamps; `None` if any row fails
    fn column_timestamps(col: &Series) -> Option<Vec<DateTime<Utc>>> {
        let millis: Vec<Option<i64>> = match col.dtype() {
            DataType::Datetime(unit, _) => {
                let divisor = match unit {
                    TimeUnit::Nanoseconds => 1_000_000,
                    TimeUnit::Microseconds => 1_000,
                    TimeUnit::Milliseconds => 1,
                };
                let raw = col.cast(&DataType::Int64).ok()?;
                raw.i64()
                    .ok()?
                    .into_iter()
                    .map(|v| v.map(|v| v / divisor))
                    .collect()
            }
            DataType::Date => {
                let raw = col.cast(&DataType::Int32).ok()?;
                raw.i32()
                    .ok()?
                    .into_iter()
                    .map(|v| v.map(|days| days as i64 * MILLIS_PER_DAY))
                    .collect()
            }
            DataType::Utf8 => col
                .utf8()
                .ok()?
                .into_iter()
                .map(|v| v.and_then(parse_timestamp).map(|ts| ts.timestamp_millis()))
                .collect(),
            _ => return None,
        };

        millis
            .into_iter()
            .map(|ms| ms.and_then(|ms| Utc.timestamp_millis_opt(ms).single()))
            .collect()
    }
}

/// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

impl PriceSeries {
    /// Create a series without a timestamp index
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            timestamps: None,
        }
    }

    /// Create a series indexed by timestamps
    pub fn with_timestamps(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::DataError(format!(
                "Timestamps length ({}) doesn't match values length ({})",
                timestamps.len(),
                values.len()
            )));
        }

        Ok(Self {
            values,
            timestamps: Some(timestamps),
        })
    }

    /// The flat ordered values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The timestamp index, if any
    pub fn timestamps(&self) -> Option<&[DateTime<Utc>]> {
        self.timestamps.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The last `n` values (all of them when the series is shorter)
    pub fn tail(&self, n: usize) -> &[f64] {
        &self.values[self.values.len().saturating_sub(n)..]
    }

    /// Timestamps for `horizon` steps after the last observation.
    ///
    /// The step is the spacing of the last two timestamps, or one day when
    /// that spacing is unavailable or not positive. `None` when a step would
    /// leave the representable date range.
    pub fn future_timestamps(&self, horizon: usize) -> Option<Vec<DateTime<Utc>>> {
        let timestamps = self.timestamps.as_ref()?;
        let last = *timestamps.last()?;

        let step = match timestamps.len() {
            n if n >= 2 => last - timestamps[n - 2],
            _ => Duration::days(1),
        };
        let step = if step > Duration::zero() {
            step
        } else {
            Duration::days(1)
        };

        let mut current = last;
        let mut future = Vec::new();
        for _ in 0..horizon {
            current = current.checked_add_signed(step)?;
            future.push(current);
        }
        Some(future)
    }
}

impl From<Vec<f64>> for PriceSeries {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl From<&[f64]> for PriceSeries {
    fn from(values: &[f64]) -> Self {
        Self::new(values.to_vec())
    }
}

impl AsRef<[f64]> for PriceSeries {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}
