use std::time::Duration;

use chrono::NaiveDate;
use rainfall_core::{NetworkError, ReqwestErrorExt, WeatherConfig};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::cache::date_key;
use crate::retry::{with_retry, RetryConfig};
use crate::types::{Coordinates, Reading};

/// Supplies the daily precipitation total for a place and date.
#[allow(async_fn_in_trait)]
pub trait PrecipitationSource {
    /// `Ok(Reading::NoData)` means the provider has nothing for that day;
    /// errors are reserved for requests that did not get a usable answer.
    async fn fetch_precipitation(
        &self,
        coordinates: Coordinates,
        date: NaiveDate,
    ) -> Result<Reading, NetworkError>;
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    daily: Option<DailyPrecipitation>,
}

#[derive(Debug, Deserialize)]
struct DailyPrecipitation {
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
}

impl ForecastResponse {
    fn first_reading(&self) -> Reading {
        self.daily
            .as_ref()
            .and_then(|daily| daily.precipitation_sum.first().copied())
            .map(Reading::from)
            .unwrap_or(Reading::NoData)
    }
}

/// Open-Meteo daily forecast client
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    client: Client,
    forecast_url: String,
    retry: RetryConfig,
}

impl OpenMeteoProvider {
    pub fn new(config: &WeatherConfig, retry: RetryConfig) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ReqwestErrorExt::into_network_error)?;

        Ok(Self {
            client,
            forecast_url: format!("{}/v1/forecast", config.base_url.trim_end_matches('/')),
            retry,
        })
    }
}

impl PrecipitationSource for OpenMeteoProvider {
    async fn fetch_precipitation(
        &self,
        coordinates: Coordinates,
        date: NaiveDate,
    ) -> Result<Reading, NetworkError> {
        let day = date_key(date);
        let latitude = coordinates.latitude.to_string();
        let longitude = coordinates.longitude.to_string();
        let query = [
            ("latitude", latitude.as_str()),
            ("longitude", longitude.as_str()),
            ("daily", "precipitation_sum"),
            ("timezone", "auto"),
            ("start_date", day.as_str()),
            ("end_date", day.as_str()),
        ];

        tracing::debug!("Fetching precipitation for {} at {}, {}", day, latitude, longitude);

        let response = with_retry(&self.retry, || {
            self.client.get(&self.forecast_url).query(&query).send()
        })
        .await
        .map_err(ReqwestErrorExt::into_network_error)?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            // Open-Meteo rejects dates outside its forecast window with 400
            let reason = response.text().await.unwrap_or_default();
            tracing::info!("No precipitation data for {}: {}", day, reason);
            return Ok(Reading::NoData);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        let body: ForecastResponse = response
            .json()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        let reading = body.first_reading();
        tracing::info!("Precipitation for {}: {}", day, reading);
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn parse(json: &str) -> ForecastResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_first_reading_value() {
        let body = parse(
            r#"{"daily": {"time": ["2024-06-01"], "precipitation_sum": [5.2]}}"#,
        );
        assert_eq!(body.first_reading(), Reading::Millimeters(5.2));
    }

    #[test]
    fn test_first_reading_zero_is_a_reading() {
        let body = parse(r#"{"daily": {"precipitation_sum": [0.0]}}"#);
        assert_eq!(body.first_reading(), Reading::Millimeters(0.0));
    }

    #[test]
    fn test_first_reading_null_is_no_data() {
        let body = parse(r#"{"daily": {"precipitation_sum": [null]}}"#);
        assert_eq!(body.first_reading(), Reading::NoData);
    }

    #[test]
    fn test_missing_daily_is_no_data() {
        assert_eq!(parse("{}").first_reading(), Reading::NoData);
        assert_eq!(
            parse(r#"{"daily": {"precipitation_sum": []}}"#).first_reading(),
            Reading::NoData
        );
        assert_eq!(parse(r#"{"daily": {}}"#).first_reading(), Reading::NoData);
    }
}
