//! Read-through lookup: geocode the place, answer from the cache when the
//! date is already known, otherwise fetch and store before returning.

use chrono::NaiveDate;
use rainfall_core::LookupError;

use crate::cache::{date_key, ForecastCache};
use crate::geocode::Geocoder;
use crate::provider::PrecipitationSource;
use crate::types::{Coordinates, Reading};

/// Where a reading came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingSource {
    Cache,
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookupOutcome {
    pub reading: Reading,
    pub source: ReadingSource,
}

/// Look up the precipitation for `place` on `date`.
///
/// The place must resolve even on a cache hit, since an unknown place is
/// reported before the cache is consulted.
pub async fn lookup<G, P>(
    cache: &mut ForecastCache,
    geocoder: &G,
    provider: &P,
    place: &str,
    date: NaiveDate,
) -> Result<LookupOutcome, LookupError>
where
    G: Geocoder,
    P: PrecipitationSource,
{
    let coordinates = resolve(geocoder, place).await?;
    precipitation_for(cache, provider, coordinates, date).await
}

/// Geocode `place`, turning "no match" into `LookupError::LocationNotFound`.
pub async fn resolve<G: Geocoder>(geocoder: &G, place: &str) -> Result<Coordinates, LookupError> {
    geocoder
        .geocode(place)
        .await?
        .ok_or_else(|| LookupError::LocationNotFound(place.to_string()))
}

/// Answer from the cache, or fetch from `provider` and store the result.
///
/// The cache is keyed by date only, so a hit may hold a reading fetched for
/// different coordinates.
pub async fn precipitation_for<P: PrecipitationSource>(
    cache: &mut ForecastCache,
    provider: &P,
    coordinates: Coordinates,
    date: NaiveDate,
) -> Result<LookupOutcome, LookupError> {
    let key = date_key(date);
    if let Some(reading) = cache.get(&key) {
        return Ok(LookupOutcome {
            reading,
            source: ReadingSource::Cache,
        });
    }

    let reading = provider.fetch_precipitation(coordinates, date).await?;
    cache.set(key, reading)?;

    Ok(LookupOutcome {
        reading,
        source: ReadingSource::Network,
    })
}
