//! services/clocker/src/config.rs
//!
//! Defines the clocker's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use clocker_core::domain::{GeoCoordinate, WorkerIdentity};
use std::time::Duration;
use tracing::Level;
use uuid::Uuid;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub attendance_api_url: String,
    pub attendance_api_token: Option<String>,
    pub worker: WorkerIdentity,
    /// Fixed device position for hosts without a location service.
    pub device_coordinates: Option<GeoCoordinate>,
    pub request_timeout: Duration,
    pub notification_duration_secs: u64,
    pub location_poll_interval: Duration,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Attendance API ---
        let attendance_api_url = std::env::var("ATTENDANCE_API_URL")
            .map_err(|_| ConfigError::MissingVar("ATTENDANCE_API_URL".to_string()))?;
        let attendance_api_token = std::env::var("ATTENDANCE_API_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());

        // --- Worker Identity ---
        let worker = WorkerIdentity {
            user_id: required_uuid("USER_ID")?,
            campus_id: required_uuid("CAMPUS_ID")?,
            department_id: required_uuid("DEPARTMENT_ID")?,
            role_id: required_uuid("ROLE_ID")?,
        };

        // --- Device Position (both or neither) ---
        let device_coordinates = match (
            optional_f64("DEVICE_LATITUDE")?,
            optional_f64("DEVICE_LONGITUDE")?,
        ) {
            (Some(latitude), Some(longitude)) => Some(GeoCoordinate::new(latitude, longitude)),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::MissingVar("DEVICE_LONGITUDE".to_string())),
            (None, Some(_)) => return Err(ConfigError::MissingVar("DEVICE_LATITUDE".to_string())),
        };

        // --- Timing ---
        let request_timeout = Duration::from_secs(u64_or("REQUEST_TIMEOUT_SECS", 15)?);
        let notification_duration_secs = u64_or("NOTIFICATION_DURATION_SECS", 5)?;
        let location_poll_secs = u64_or("LOCATION_POLL_SECS", 10)?;
        if location_poll_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "LOCATION_POLL_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let location_poll_interval = Duration::from_secs(location_poll_secs);

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            attendance_api_url,
            attendance_api_token,
            worker,
            device_coordinates,
            request_timeout,
            notification_duration_secs,
            location_poll_interval,
            log_level,
        })
    }
}

fn required_uuid(name: &str) -> Result<Uuid, ConfigError> {
    let value = std::env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))?;
    Uuid::parse_str(value.trim())
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}

fn optional_f64(name: &str) -> Result<Option<f64>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => {
            let parsed = value
                .trim()
                .parse::<f64>()
                .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))?;
            if !parsed.is_finite() {
                return Err(ConfigError::InvalidValue(
                    name.to_string(),
                    format!("'{}' is not a finite number", value),
                ));
            }
            Ok(Some(parsed))
        }
        Err(_) => Ok(None),
    }
}

fn u64_or(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
