//! Centralized error types for the Rainfall application.
//!
//! This module provides a typed error hierarchy that:
//! - Separates per-query failures (unknown place, network trouble, bad input)
//!   from failures of the forecast cache's own integrity
//! - Provides user-friendly messages suitable for console display
//! - Preserves full error context for logging

use std::path::PathBuf;

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` for console output and `is_fatal()` to decide whether
/// the interactive loop may continue.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Forecast cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display on the console.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Cache(e) => e.user_message(),
            AppError::Lookup(e) => e.user_message(),
            AppError::Input(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
        }
    }

    /// Whether this error must stop the program.
    ///
    /// Errors about the cache's integrity or the configuration cannot be
    /// recovered from inside the loop; everything else is reported per query.
    pub fn is_fatal(&self) -> bool {
        match self {
            AppError::Cache(_) | AppError::Config(_) | AppError::Io(_) => true,
            AppError::Lookup(e) => e.is_fatal(),
            AppError::Network(_) | AppError::Input(_) => false,
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No configuration directory available on this system")]
    NoConfigDir,

    #[error("Configuration file I/O failed: {0}")]
    Io(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NoConfigDir => "Could not locate a configuration directory.",
            ConfigError::Io(_) => "The configuration file could not be read or written.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Forecast cache errors.
///
/// None of these are recoverable inside the cache: a store that cannot be
/// read or written has no defined repair path.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backing file exists but is not a mapping of dates to readings.
    #[error("Cache file {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read cache file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The mapping could not be persisted; the in-memory entry was not kept.
    #[error("Failed to write cache file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize cache: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl CacheError {
    pub fn user_message(&self) -> &'static str {
        match self {
            CacheError::Corrupt { .. } => {
                "The saved results file is corrupted. Remove or repair it and restart."
            }
            CacheError::Read { .. } => "The saved results file could not be read.",
            CacheError::Write { .. } | CacheError::Serialize(_) => {
                "Failed to save results. Check that the results file is writable."
            }
        }
    }
}

/// Errors from a single city/date lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Could not find coordinates for {0}")]
    LocationNotFound(String),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl LookupError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LookupError::LocationNotFound(_) => "Location not found. Check and try again.",
            LookupError::Network(e) => e.user_message(),
            LookupError::Cache(e) => e.user_message(),
        }
    }

    /// Only cache failures end the session; the rest affect one query.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LookupError::Cache(_))
    }
}

/// Errors in user-entered values.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Incorrect date format: {0:?} (expected YYYY-MM-DD)")]
    MalformedDate(String),
}

impl InputError {
    pub fn user_message(&self) -> &'static str {
        match self {
            InputError::MalformedDate(_) => "Incorrect date format, please try it again.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
