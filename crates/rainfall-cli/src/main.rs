mod driver;
mod input;
mod report;

use anyhow::Result;
use rainfall_core::{AppError, Config};
use rainfall_weather::{ForecastCache, NominatimGeocoder, OpenMeteoProvider, RetryConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    rainfall_core::init()?;

    if let Err(e) = run().await {
        eprintln!("{}", e.user_message());
        return Err(e.into());
    }

    tracing::info!("Session finished");
    Ok(())
}

async fn run() -> Result<(), AppError> {
    let (config, _) = Config::load_validated()?;
    let retry = RetryConfig::from(&config.retry);
    let geocoder = NominatimGeocoder::new(&config.geocoding, retry.clone())?;
    let provider = OpenMeteoProvider::new(&config.weather, retry)?;

    let mut cache = ForecastCache::load(&config.cache.path)?;
    tracing::info!(
        "Using {} ({} cached readings)",
        cache.path().display(),
        cache.len()
    );

    let today = chrono::Local::now().date_naive();
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    driver::run(
        &mut stdin.lock(),
        &mut stdout.lock(),
        &mut cache,
        &geocoder,
        &provider,
        today,
    )
    .await
}
