//! Precipitation lookup for Rainfall
//!
//! Resolves place names via Nominatim, fetches daily precipitation from
//! Open-Meteo, and keeps every answer in a date-keyed file cache so repeat
//! queries never touch the network.

pub mod types;
pub mod cache;
pub mod geocode;
pub mod lookup;
pub mod provider;
pub mod retry;

pub use types::*;
pub use cache::{date_key, ForecastCache};
pub use geocode::{Geocoder, NominatimGeocoder};
pub use lookup::{lookup, precipitation_for, resolve, LookupOutcome, ReadingSource};
pub use provider::{OpenMeteoProvider, PrecipitationSource};
pub use retry::RetryConfig;
