//! Interactive prompt loop: city, then date, then the answer.
//!
//! Per-query problems (unknown city, bad date, network trouble) are printed
//! and the loop carries on. Cache and I/O failures end the session.

use std::io::{BufRead, Write};

use chrono::NaiveDate;
use rainfall_core::AppError;
use rainfall_weather::{
    precipitation_for, resolve, ForecastCache, Geocoder, PrecipitationSource, ReadingSource,
};

use crate::input::{is_exit_command, parse_date_input, read_line};
use crate::report;

const CITY_PROMPT: &str = "Enter the city name (or \"end\" to finish): ";
const DATE_PROMPT: &str = "Add date (YYYY-MM-DD) or press enter for tomorrow: ";

pub async fn run<R, W, G, P>(
    input: &mut R,
    out: &mut W,
    cache: &mut ForecastCache,
    geocoder: &G,
    provider: &P,
    today: NaiveDate,
) -> Result<(), AppError>
where
    R: BufRead,
    W: Write,
    G: Geocoder,
    P: PrecipitationSource,
{
    loop {
        write!(out, "{}", CITY_PROMPT)?;
        out.flush()?;

        let Some(line) = read_line(input)? else { break };
        let city = line.trim();
        if is_exit_command(city) {
            break;
        }
        if city.is_empty() {
            continue;
        }

        let coordinates = match resolve(geocoder, city).await {
            Ok(coordinates) => coordinates,
            Err(e) if !e.is_fatal() => {
                tracing::debug!("Lookup for {:?} failed: {}", city, e);
                writeln!(out, "{}\n", report::lookup_failure(city, &e))?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let Some(date) = prompt_date(input, out, today)? else { break };

        match precipitation_for(cache, provider, coordinates, date).await {
            Ok(outcome) => {
                if outcome.source == ReadingSource::Cache {
                    tracing::debug!("Answered {} from cache", date);
                }
                writeln!(out, "{}\n", report::describe(city, date, outcome.reading))?;
            }
            Err(e) if !e.is_fatal() => {
                tracing::warn!("Precipitation lookup for {:?} failed: {}", city, e);
                writeln!(out, "{}\n", report::lookup_failure(city, &e))?;
            }
            Err(e) => return Err(e.into()),
        }
    }

    for (date, reading) in cache.items() {
        writeln!(out, "{}", report::summary_line(date, reading))?;
    }
    out.flush()?;
    Ok(())
}

/// Ask until the date parses; `None` if input ends first.
fn prompt_date<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    today: NaiveDate,
) -> Result<Option<NaiveDate>, AppError> {
    loop {
        write!(out, "{}", DATE_PROMPT)?;
        out.flush()?;

        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        match parse_date_input(&line, today) {
            Ok(date) => return Ok(Some(date)),
            Err(e) => {
                tracing::debug!("Rejected date input: {}", e);
                writeln!(out, "{}", e.user_message())?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use rainfall_core::NetworkError;
    use rainfall_weather::{Coordinates, Reading};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct OneCity;

    impl Geocoder for OneCity {
        async fn geocode(&self, place: &str) -> Result<Option<Coordinates>, NetworkError> {
            Ok((place == "Seattle").then_some(Coordinates {
                latitude: 47.6,
                longitude: -122.3,
            }))
        }
    }

    struct Fixed {
        reading: Reading,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(reading: Reading) -> Self {
            Self {
                reading,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl PrecipitationSource for Fixed {
        async fn fetch_precipitation(
            &self,
            _coordinates: Coordinates,
            _date: NaiveDate,
        ) -> Result<Reading, NetworkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reading)
        }
    }

    fn june_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    async fn session(
        script: &str,
        cache: &mut ForecastCache,
        provider: &Fixed,
    ) -> Result<String, AppError> {
        let mut input = Cursor::new(script.as_bytes());
        let mut out = Vec::new();
        run(&mut input, &mut out, cache, &OneCity, provider, june_first()).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_rain_is_reported_and_summarized() {
        let dir = tempdir().unwrap();
        let mut cache = ForecastCache::load(dir.path().join("results.json")).unwrap();
        let provider = Fixed::new(Reading::Millimeters(5.2));

        let out = session("Seattle\n2024-06-01\nend\n", &mut cache, &provider)
            .await
            .unwrap();

        assert!(out.contains("Rainfall for Seattle on 2024-06-01: 5.2 mm."));
        assert!(out.contains("Date: 2024-06-01, Weather: 5.2 mm"));
    }

    #[tokio::test]
    async fn test_repeat_query_uses_cache() {
        let dir = tempdir().unwrap();
        let mut cache = ForecastCache::load(dir.path().join("results.json")).unwrap();
        let provider = Fixed::new(Reading::Millimeters(0.0));

        let out = session(
            "Seattle\n2024-06-01\nSeattle\n2024-06-01\nend\n",
            &mut cache,
            &provider,
        )
        .await
        .unwrap();

        assert_eq!(out.matches("No rain for Seattle on 2024-06-01").count(), 2);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blank_date_means_tomorrow() {
        let dir = tempdir().unwrap();
        let mut cache = ForecastCache::load(dir.path().join("results.json")).unwrap();
        let provider = Fixed::new(Reading::NoData);

        let out = session("Seattle\n\nend\n", &mut cache, &provider)
            .await
            .unwrap();

        assert!(out.contains("No data available for Seattle on 2024-06-02"));
        assert_eq!(cache.get("2024-06-02"), Some(Reading::NoData));
    }

    #[tokio::test]
    async fn test_malformed_date_reprompts() {
        let dir = tempdir().unwrap();
        let mut cache = ForecastCache::load(dir.path().join("results.json")).unwrap();
        let provider = Fixed::new(Reading::Millimeters(1.0));

        let out = session("Seattle\n06/01/2024\n2024-06-01\nEND\n", &mut cache, &provider)
            .await
            .unwrap();

        assert!(out.contains("Incorrect date format, please try it again."));
        assert_eq!(out.matches(DATE_PROMPT).count(), 2);
        assert!(out.contains("Rainfall for Seattle on 2024-06-01: 1 mm."));
    }

    #[tokio::test]
    async fn test_unknown_city_continues() {
        let dir = tempdir().unwrap();
        let mut cache = ForecastCache::load(dir.path().join("results.json")).unwrap();
        let provider = Fixed::new(Reading::Millimeters(1.0));

        let out = session("Atlantis\nSeattle\n2024-06-01\nend\n", &mut cache, &provider)
            .await
            .unwrap();

        assert!(out.contains("Could not find coordinates for Atlantis. Please try again."));
        assert!(out.contains("Rainfall for Seattle on 2024-06-01"));
        assert_eq!(out.matches(DATE_PROMPT).count(), 1);
    }

    #[tokio::test]
    async fn test_end_of_input_finishes_session() {
        let dir = tempdir().unwrap();
        let mut cache = ForecastCache::load(dir.path().join("results.json")).unwrap();
        cache.set("2024-05-31", Reading::Millimeters(2.0)).unwrap();
        let provider = Fixed::new(Reading::Millimeters(1.0));

        let out = session("Seattle\n", &mut cache, &provider).await.unwrap();

        assert!(out.contains("Date: 2024-05-31, Weather: 2 mm"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cache_write_failure_ends_session() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        let mut cache = ForecastCache::load(blocker.join("results.json")).unwrap();
        std::fs::write(&blocker, "not a directory").unwrap();
        let provider = Fixed::new(Reading::Millimeters(1.0));

        let err = session("Seattle\n2024-06-01\nSeattle\n2024-06-02\nend\n", &mut cache, &provider)
            .await
            .unwrap_err();

        assert!(err.is_fatal());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
