use std::env;
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://soulsense_db";
const DEFAULT_BENCHMARKS_PATH: &str = "data/benchmarks.json";
const DEFAULT_LOOKBACK_DAYS: i64 = 30;

/// Runtime configuration, read from the environment (and `.env` if present).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    pub benchmarks_path: PathBuf,
    pub lookback_days: i64,
    pub telemetry: TelemetryConfig,
}

/// Tracing controls.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("EQ_LOOKBACK_DAYS must be a positive integer, got '{0}'")]
    InvalidLookback(String),
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let benchmarks_path = lookup("EQ_BENCHMARKS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BENCHMARKS_PATH));
        let log_level = lookup("EQ_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let lookback_days = match lookup("EQ_LOOKBACK_DAYS") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(days) if days > 0 => days,
                _ => return Err(ConfigError::InvalidLookback(raw)),
            },
            None => DEFAULT_LOOKBACK_DAYS,
        };

        Ok(Self {
            database_url,
            benchmarks_path,
            lookback_days,
            telemetry: TelemetryConfig { log_level },
        })
    }
}
