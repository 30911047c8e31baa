use chrono::NaiveDate;
use rainfall_core::LookupError;
use rainfall_weather::{date_key, RainfallKind, Reading};

pub fn describe(city: &str, date: NaiveDate, reading: Reading) -> String {
    let day = date_key(date);
    match reading.kind() {
        RainfallKind::Rain(mm) => format!("Rainfall for {} on {}: {} mm.", city, day, mm),
        RainfallKind::Dry => format!("No rain for {} on {}", city, day),
        RainfallKind::NoData => format!("No data available for {} on {}", city, day),
    }
}

pub fn lookup_failure(city: &str, error: &LookupError) -> String {
    match error {
        LookupError::LocationNotFound(_) => {
            format!("Could not find coordinates for {}. Please try again.", city)
        }
        other => format!("Lookup for {} failed: {}", city, other.user_message()),
    }
}

pub fn summary_line(date: &str, reading: Reading) -> String {
    format!("Date: {}, Weather: {}", date, reading)
}
