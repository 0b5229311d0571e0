use chrono::{DateTime, Duration, TimeZone, Utc};
use lag_forecast::data::{DataLoader, PriceSeries};
use lag_forecast::ForecastError;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_data_loader_from_csv() {
    let file = csv_file(&[
        "date,open,high,low,close,volume",
        "2023-01-01,100.0,105.0,98.0,103.0,1000",
        "2023-01-02,103.0,107.0,101.0,106.0,1200",
        "2023-01-03,106.0,110.0,104.0,108.0,1500",
    ]);

    let series = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(series.values(), &[103.0, 106.0, 108.0]);
    let timestamps = series.timestamps().unwrap();
    assert_eq!(timestamps[0], Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(timestamps[2], Utc.with_ymd_and_hms(2023, 1, 3, 0, 0, 0).unwrap());
}

#[test]
fn test_null_closes_are_dropped() {
    let file = csv_file(&[
        "date,close",
        "2023-01-01,10.0",
        "2023-01-02,",
        "2023-01-03,12.5",
    ]);

    let series = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(series.values(), &[10.0, 12.5]);
    assert_eq!(series.timestamps().map(|t| t.len()), Some(2));
}

#[test]
fn test_price_column_fallback_without_dates() {
    let file = csv_file(&["symbol,price", "ABC,1.5", "ABC,1.75"]);

    let series = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(series.values(), &[1.5, 1.75]);
    assert!(series.timestamps().is_none());
}

#[test]
fn test_missing_close_column() {
    let file = csv_file(&["date,volume", "2023-01-01,100"]);
    let result = DataLoader::from_csv(file.path());
    assert!(matches!(result, Err(ForecastError::DataError(_))));
}

#[test]
fn test_missing_file_is_io_error() {
    let result = DataLoader::from_csv("/definitely/not/here.csv");
    assert!(matches!(result, Err(ForecastError::IoError(_))));
}

#[test]
fn test_series_operations() {
    let series = PriceSeries::from(vec![1.0, 2.0, 3.0, 4.0]);

    assert_eq!(series.len(), 4);
    assert!(!series.is_empty());
    assert_eq!(series.tail(2), &[3.0, 4.0]);
    assert_eq!(series.tail(10), &[1.0, 2.0, 3.0, 4.0]);
    assert!(series.future_timestamps(3).is_none());
}

#[test]
fn test_mismatched_timestamps_rejected() {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let result = PriceSeries::with_timestamps(vec![start], vec![1.0, 2.0]);
    assert!(matches!(result, Err(ForecastError::DataError(_))));
}

#[test]
fn test_future_timestamps_follow_last_spacing() {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    let timestamps = vec![start, start + Duration::hours(1), start + Duration::hours(2)];
    let series = PriceSeries::with_timestamps(timestamps, vec![1.0, 2.0, 3.0]).unwrap();

    let future = series.future_timestamps(2).unwrap();
    assert_eq!(
        future,
        vec![start + Duration::hours(3), start + Duration::hours(4)]
    );
}

#[test]
fn test_future_timestamps_default_to_daily() {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let single = PriceSeries::with_timestamps(vec![start], vec![1.0]).unwrap();
    assert_eq!(
        single.future_timestamps(1).unwrap(),
        vec![start + Duration::days(1)]
    );

    let repeated = PriceSeries::with_timestamps(vec![start, start], vec![1.0, 2.0]).unwrap();
    assert_eq!(
        repeated.future_timestamps(1).unwrap(),
        vec![start + Duration::days(1)]
    );
}

#[test]
fn test_future_timestamps_past_representable_range() {
    let last = DateTime::<Utc>::MAX_UTC - Duration::days(1);
    let series =
        PriceSeries::with_timestamps(vec![last - Duration::days(1), last], vec![1.0, 2.0]).unwrap();

    assert_eq!(series.future_timestamps(5), None);
}
