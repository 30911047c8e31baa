pub mod config;
pub mod error;

pub use config::{
    CacheConfig, Config, GeocodingConfig, RetrySettings, SettingIssue, ValidationResult,
    WeatherConfig,
};
pub use error::{
    AppError, CacheError, ConfigError, InputError, LookupError, NetworkError, ReqwestErrorExt,
};

use anyhow::Result;

/// Initialize logging for the process.
///
/// Diagnostics go to stderr so the interactive prompts on stdout stay readable.
/// The filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("Rainfall core initialized");
    Ok(())
}
