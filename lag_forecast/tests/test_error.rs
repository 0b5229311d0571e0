use lag_forecast::error::{FailureReason, ForecastError};
use lag_forecast::{DataLoader, ForecastConfig};
use rstest::rstest;
use std::io;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    assert!(matches!(
        ForecastError::from(io_error),
        ForecastError::IoError(_)
    ));

    let json_error = serde_json::from_str::<Vec<f64>>("[1.0,").unwrap_err();
    assert!(matches!(
        ForecastError::from(json_error),
        ForecastError::SerializationError(_)
    ));

    let math_error = trade_math::MathError::InsufficientData("empty".to_string());
    assert!(matches!(
        ForecastError::from(math_error),
        ForecastError::MathError(_)
    ));
}

#[test]
fn test_error_display() {
    let error = ForecastError::InvalidParameter("nlags must be positive".to_string());
    assert_eq!(
        format!("{}", error),
        "Invalid parameter: nlags must be positive"
    );

    let error = ForecastError::InsufficientHistory {
        required: 20,
        actual: 19,
    };
    let message = format!("{}", error);
    assert!(message.contains("20"));
    assert!(message.contains("19"));
}

#[rstest]
#[case(ForecastError::InsufficientHistory { required: 20, actual: 3 }, FailureReason::InsufficientHistory)]
#[case(ForecastError::DegenerateInput("nan".into()), FailureReason::DegenerateInput)]
#[case(ForecastError::DataError("no close".into()), FailureReason::DegenerateInput)]
#[case(ForecastError::InvalidParameter("test_size".into()), FailureReason::InvalidConfig)]
#[case(ForecastError::ModelError("width".into()), FailureReason::FitFailure)]
#[case(ForecastError::CacheError("rename".into()), FailureReason::Cache)]
#[case(ForecastError::IoError(io::Error::new(io::ErrorKind::NotFound, "prices.csv")), FailureReason::DataUnavailable)]
#[case(ForecastError::PolarsError("bad csv".into()), FailureReason::DataUnavailable)]
fn test_failure_reason(#[case] error: ForecastError, #[case] expected: FailureReason) {
    assert_eq!(error.reason(), expected);
}

#[test]
fn test_missing_csv_is_a_data_failure() {
    let err = DataLoader::from_csv("/definitely/not/here.csv").unwrap_err();
    assert_eq!(err.reason(), FailureReason::DataUnavailable);
}

#[test]
fn test_malformed_config_is_a_config_failure() {
    let err = ForecastConfig::from_json_str("{ days: 3 }").unwrap_err();
    assert_eq!(err.reason(), FailureReason::InvalidConfig);
}
