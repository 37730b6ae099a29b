//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// OAuth2 client settings for the Google Calendar integration.
#[derive(Clone, Debug)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub data_path: PathBuf,
    pub log_level: Level,
    pub frontend_origin: String,
    pub cookie_secure: bool,
    /// `None` disables the calendar endpoints.
    pub google: Option<GoogleConfig>,
    pub calendar_time_zone: String,
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

        // --- Load Server and Storage Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5050".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let data_path = std::env::var("DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./db.json"));

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let frontend_origin = std::env::var("FRONTEND_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        let cookie_secure = match std::env::var("COOKIE_SECURE") {
            Ok(value) => value.parse::<bool>().map_err(|_| {
                ConfigError::InvalidValue(
                    "COOKIE_SECURE".to_string(),
                    format!("'{}' is not true or false", value),
                )
            })?,
            Err(_) => false,
        };

        // --- Load Google Calendar Settings (all or nothing) ---
        let google = Self::google_from_env()?;

        let calendar_time_zone = std::env::var("CALENDAR_TIME_ZONE")
            .unwrap_or_else(|_| "America/New_York".to_string());

        Ok(Self {
            bind_address,
            data_path,
            log_level,
            frontend_origin,
            cookie_secure,
            google,
            calendar_time_zone,
        })
    }

    fn google_from_env() -> Result<Option<GoogleConfig>, ConfigError> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID").ok();
        let client_secret = std::env::var("GOOGLE_CLIENT_SECRET").ok();
        let redirect_uri = std::env::var("GOOGLE_REDIRECT").ok();

        match (client_id, client_secret, redirect_uri) {
            (None, None, None) => Ok(None),
            (Some(client_id), Some(client_secret), Some(redirect_uri)) => Ok(Some(GoogleConfig {
                client_id,
                client_secret,
                redirect_uri,
            })),
            (client_id, client_secret, _) => {
                let missing = if client_id.is_none() {
                    "GOOGLE_CLIENT_ID"
                } else if client_secret.is_none() {
                    "GOOGLE_CLIENT_SECRET"
                } else {
                    "GOOGLE_REDIRECT"
                };
                Err(ConfigError::MissingVar(missing.to_string()))
            }
        }
    }
}
