// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Open-Meteo client and the hourly temperature matching used to derive an
//! activity's outdoor temperature.
//!
//! Activities older than [`ARCHIVE_THRESHOLD_DAYS`] are looked up in the ERA5
//! archive for their start/end dates; recent ones use the forecast endpoint
//! with a trailing lookback window.

use crate::error::AppError;
use crate::time_utils::{format_utc_date, parse_open_meteo_hour};
use chrono::{DateTime, Duration, DurationRound, Timelike, Utc};
use serde::Deserialize;
use std::str::FromStr;

/// Activities that started more than this many days ago use the archive.
pub const ARCHIVE_THRESHOLD_DAYS: i64 = 3;

/// Lookback window requested from the forecast endpoint.
pub const FORECAST_PAST_DAYS: u32 = 3;

const HOURLY_VARIABLE: &str = "temperature_2m";

/// Which Open-Meteo endpoint to query for an activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeatherSource {
    /// Historical archive covering `start_date..=end_date` (`YYYY-MM-DD`)
    Archive { start_date: String, end_date: String },
    /// Forecast endpoint with `past_days` of history
    Forecast { past_days: u32 },
}

impl WeatherSource {
    /// Pick the endpoint for an activity spanning `start..end`, as seen at `now`.
    ///
    /// Strictly more than three days ago selects the archive; exactly three
    /// days ago still uses the forecast.
    pub fn select(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now - start > Duration::days(ARCHIVE_THRESHOLD_DAYS) {
            WeatherSource::Archive {
                start_date: format_utc_date(start),
                end_date: format_utc_date(end),
            }
        } else {
            WeatherSource::Forecast {
                past_days: FORECAST_PAST_DAYS,
            }
        }
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, WeatherSource::Archive { .. })
    }
}

/// How hourly samples are matched against the activity window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Compare UTC hour-of-day only: a sample matches when its hour lies in
    /// `[start.hour, end.hour]`, whatever its calendar day. Activities that
    /// cross midnight match nothing.
    #[default]
    HourOfDay,
    /// Compare full timestamps: a sample matches when its hour lies in
    /// `[start truncated to the hour, end]`.
    Timestamp,
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hour-of-day" => Ok(MatchMode::HourOfDay),
            "timestamp" => Ok(MatchMode::Timestamp),
            other => Err(format!(
                "unknown match mode '{}' (expected hour-of-day or timestamp)",
                other
            )),
        }
    }
}

/// Hourly series returned by Open-Meteo.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HourlySeries {
    pub time: Vec<String>,
    /// Missing samples are `null`
    pub temperature_2m: Vec<Option<f64>>,
}

impl HourlySeries {
    pub fn is_empty(&self) -> bool {
        self.temperature_2m.is_empty()
    }

    /// Average of the samples inside `start..=end` under `mode`, rounded to
    /// two decimals. `None` when nothing matched.
    pub fn average_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        mode: MatchMode,
    ) -> Option<f64> {
        let window_start = start
            .duration_trunc(Duration::hours(1))
            .unwrap_or(start);

        let matched: Vec<f64> = self
            .time
            .iter()
            .zip(self.temperature_2m.iter())
            .filter_map(|(time, temp)| {
                let hour = match parse_open_meteo_hour(time) {
                    Some(h) => h,
                    None => {
                        tracing::debug!(time = %time, "Skipping unparseable weather timestamp");
                        return None;
                    }
                };
                let in_window = match mode {
                    MatchMode::HourOfDay => {
                        hour.hour() >= start.hour() && hour.hour() <= end.hour()
                    }
                    MatchMode::Timestamp => hour >= window_start && hour <= end,
                };
                if in_window {
                    *temp
                } else {
                    None
                }
            })
            .collect();

        if matched.is_empty() {
            return None;
        }

        let mean = matched.iter().sum::<f64>() / matched.len() as f64;
        Some(round_to_hundredths(mean))
    }
}

/// Round to two decimal places.
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    hourly: Option<HourlySeries>,
}

/// Open-Meteo HTTP client.
#[derive(Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    archive_url: String,
    forecast_url: String,
}

impl WeatherClient {
    pub fn new(archive_url: impl Into<String>, forecast_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            archive_url: archive_url.into(),
            forecast_url: forecast_url.into(),
        }
    }

    /// Fetch the hourly temperature series around a coordinate.
    ///
    /// A response without an `hourly` block yields an empty series.
    pub async fn hourly_temperatures(
        &self,
        latitude: f64,
        longitude: f64,
        source: &WeatherSource,
    ) -> Result<HourlySeries, AppError> {
        let mut params: Vec<(&str, String)> = vec![
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("hourly", HOURLY_VARIABLE.to_string()),
            ("timezone", "GMT".to_string()),
        ];

        let url = match source {
            WeatherSource::Archive {
                start_date,
                end_date,
            } => {
                params.push(("start_date", start_date.clone()));
                params.push(("end_date", end_date.clone()));
                &self.archive_url
            }
            WeatherSource::Forecast { past_days } => {
                params.push(("past_days", past_days.to_string()));
                &self.forecast_url
            }
        };

        let response = self
            .http
            .get(url)
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::WeatherApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::WeatherApi(format!("HTTP {}: {}", status, body)));
        }

        let body: WeatherResponse = response
            .json()
            .await
            .map_err(|e| AppError::WeatherApi(format!("JSON parse error: {}", e)))?;

        Ok(body.hourly.unwrap_or_default())
    }
}
