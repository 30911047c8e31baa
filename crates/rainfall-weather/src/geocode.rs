//! Forward geocoding: convert a place name to coordinates.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use std::time::Duration;

use rainfall_core::{GeocodingConfig, NetworkError, ReqwestErrorExt};
use reqwest::Client;
use serde::Deserialize;

use crate::retry::{with_retry, RetryConfig};
use crate::types::Coordinates;

/// Resolves place names to coordinates.
#[allow(async_fn_in_trait)]
pub trait Geocoder {
    /// `Ok(None)` means the service answered but knows no such place.
    async fn geocode(&self, place: &str) -> Result<Option<Coordinates>, NetworkError>;
}

/// Nominatim returns coordinates as decimal strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    search_url: String,
    retry: RetryConfig,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocodingConfig, retry: RetryConfig) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(ReqwestErrorExt::into_network_error)?;

        Ok(Self {
            client,
            search_url: format!("{}/search", config.base_url.trim_end_matches('/')),
            retry,
        })
    }
}

impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, place: &str) -> Result<Option<Coordinates>, NetworkError> {
        let place = place.trim();
        if place.is_empty() {
            return Ok(None);
        }

        let query = [("q", place), ("format", "json"), ("limit", "1")];
        let response = with_retry(&self.retry, || {
            self.client.get(&self.search_url).query(&query).send()
        })
        .await
        .map_err(ReqwestErrorExt::into_network_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::debug!("Geocode for {:?} returned status {}", place, status);
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        let Some(found) = places.into_iter().next() else {
            tracing::info!("No geocoding match for {:?}", place);
            return Ok(None);
        };

        let coordinates = Coordinates {
            latitude: parse_degrees(&found.lat, "lat")?,
            longitude: parse_degrees(&found.lon, "lon")?,
        };

        tracing::info!(
            "Geocoded {:?} to {}, {} ({})",
            place,
            coordinates.latitude,
            coordinates.longitude,
            found.display_name.as_deref().unwrap_or("unnamed")
        );
        Ok(Some(coordinates))
    }
}

fn parse_degrees(value: &str, field: &str) -> Result<f64, NetworkError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| NetworkError::InvalidResponse(format!("bad {} {:?}: {}", field, value, e)))
}
