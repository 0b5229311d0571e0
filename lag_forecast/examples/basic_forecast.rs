use lag_forecast::{train_and_forecast, DataLoader, ForecastConfig, PriceSeries};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("Lag Forecast: Basic Example");
    println!("===========================\n");

    // Usage: basic_forecast [prices.csv] [config.json]
    let mut args = std::env::args().skip(1);
    let series = match args.next() {
        Some(path) => DataLoader::from_csv(path)?,
        None => sample_series(),
    };
    let config = match args.next() {
        Some(path) => ForecastConfig::from_json_file(path)?,
        None => ForecastConfig::default(),
    };

    println!(
        "Forecasting {} steps from {} observations (nlags = {}, family = {})\n",
        config.days,
        series.len(),
        config.nlags,
        config.model_family
    );

    let outcome = train_and_forecast(&series, &config);
    if let Some(reason) = outcome.failure {
        println!("No forecast available: {:?}", reason);
        return Ok(());
    }

    let (_, forecast, metrics) = outcome.into_parts();
    if let Some(metrics) = metrics {
        println!("{}", metrics);
    }

    let last = series.values().last().copied().unwrap_or_default();
    println!("Last observed: {:.2}", last);
    for (step, value) in forecast.unwrap_or_default().iter().enumerate() {
        println!("  t+{:<3} {:>10.2}", step + 1, value);
    }

    Ok(())
}

fn sample_series() -> PriceSeries {
    let prices: Vec<f64> = (0..250)
        .map(|i| {
            let t = i as f64;
            100.0 + t * 0.08 + 4.0 * (t * 0.15).sin() + 1.5 * (t * 0.9).cos()
        })
        .collect();
    PriceSeries::new(prices)
}
