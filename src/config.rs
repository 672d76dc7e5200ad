// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Configuration loaded from environment variables (and `.env`, if present).
//!
//! Each subcommand builds the configuration it needs once at startup and
//! passes it down explicitly. Missing required variables are reported before
//! any network or database call is made.

use std::env;

pub const DEFAULT_STRAVA_API_URL: &str = "https://www.strava.com/api/v3";
pub const DEFAULT_STRAVA_OAUTH_URL: &str = "https://www.strava.com/oauth";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost/exchange_token";
pub const DEFAULT_WEATHER_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/era5";
pub const DEFAULT_WEATHER_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Configuration for subcommands that touch the activity store.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string
    pub database_url: String,
    /// Strava REST API base URL
    pub strava_api_url: String,
    /// Open-Meteo historical archive endpoint
    pub weather_archive_url: String,
    /// Open-Meteo forecast endpoint
    pub weather_forecast_url: String,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env_with(|k| env::var(k).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let database_url = get("PG_CONNECTION_STRING")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("PG_CONNECTION_STRING"))?;

        Ok(Self {
            database_url,
            strava_api_url: get("STRAVA_API_URL")
                .unwrap_or_else(|| DEFAULT_STRAVA_API_URL.to_string()),
            weather_archive_url: get("WEATHER_ARCHIVE_URL")
                .unwrap_or_else(|| DEFAULT_WEATHER_ARCHIVE_URL.to_string()),
            weather_forecast_url: get("WEATHER_FORECAST_URL")
                .unwrap_or_else(|| DEFAULT_WEATHER_FORECAST_URL.to_string()),
        })
    }
}

/// Strava OAuth application credentials for the token helper.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Base URL of the Strava OAuth endpoints (`/authorize`, `/token`)
    pub oauth_url: String,
    /// Redirect target registered for the application
    pub redirect_uri: String,
}

impl OAuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env_with(|k| env::var(k).ok())
    }

    pub fn from_env_with<F>(mut get: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let client_id = get("STRAVA_CLIENT_ID")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("STRAVA_CLIENT_ID"))?;
        let client_secret = get("STRAVA_CLIENT_SECRET")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("STRAVA_CLIENT_SECRET"))?;

        Ok(Self {
            client_id: client_id.trim().to_string(),
            client_secret,
            oauth_url: get("STRAVA_OAUTH_URL")
                .unwrap_or_else(|| DEFAULT_STRAVA_OAUTH_URL.to_string()),
            redirect_uri: get("STRAVA_REDIRECT_URI")
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
