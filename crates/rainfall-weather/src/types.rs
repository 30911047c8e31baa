use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A daily precipitation reading.
///
/// Stored as a JSON number (millimetres) or `null`. `NoData` is a real answer
/// from the provider and is cached like any other reading; it is never the
/// same thing as `Millimeters(0.0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Reading {
    Millimeters(f64),
    NoData,
}

/// How a reading should be reported to the user
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RainfallKind {
    Rain(f64),
    Dry,
    NoData,
}

impl Reading {
    pub fn kind(&self) -> RainfallKind {
        match *self {
            Reading::Millimeters(mm) if mm > 0.0 => RainfallKind::Rain(mm),
            Reading::Millimeters(_) => RainfallKind::Dry,
            Reading::NoData => RainfallKind::NoData,
        }
    }

    pub fn millimeters(&self) -> Option<f64> {
        match *self {
            Reading::Millimeters(mm) => Some(mm),
            Reading::NoData => None,
        }
    }
}

impl From<Option<f64>> for Reading {
    fn from(value: Option<f64>) -> Self {
        // non-finite amounts have no JSON number form
        match value {
            Some(mm) if mm.is_finite() => Reading::Millimeters(mm),
            _ => Reading::NoData,
        }
    }
}

impl From<Reading> for Option<f64> {
    fn from(reading: Reading) -> Self {
        reading.millimeters()
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Millimeters(mm) => write!(f, "{} mm", mm),
            Reading::NoData => write!(f, "no data"),
        }
    }
}
