// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity model as returned by the list endpoint and stored in the
//! `activities` table.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Summary activity from `GET /athlete/activities`.
///
/// Field names match the Strava JSON and, for nested objects, the stored
/// column names (`athlete.id`, `map.summary_polyline`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Strava activity ID (primary key)
    pub id: i64,
    pub resource_state: Option<i32>,
    pub athlete: AthleteRef,
    pub name: String,
    /// Distance in meters
    pub distance: Option<f64>,
    /// Moving time in seconds
    pub moving_time: Option<i64>,
    /// Elapsed time in seconds
    pub elapsed_time: Option<i64>,
    pub total_elevation_gain: Option<f64>,
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    pub sport_type: Option<String>,
    pub workout_type: Option<i32>,
    pub start_date: DateTime<Utc>,
    /// Local start time, as sent by Strava (no offset applied)
    pub start_date_local: Option<String>,
    pub timezone: Option<String>,
    pub utc_offset: Option<f64>,
    pub location_city: Option<String>,
    pub location_state: Option<String>,
    pub location_country: Option<String>,
    pub achievement_count: Option<i32>,
    pub kudos_count: Option<i32>,
    pub comment_count: Option<i32>,
    pub athlete_count: Option<i32>,
    pub photo_count: Option<i32>,
    #[serde(default)]
    pub map: ActivityMap,
    pub trainer: Option<bool>,
    pub commute: Option<bool>,
    pub manual: Option<bool>,
    pub private: Option<bool>,
    pub visibility: Option<String>,
    pub flagged: Option<bool>,
    pub gear_id: Option<String>,
    /// `[lat, lng]`, `[]` for activities without GPS
    pub start_latlng: Option<Vec<f64>>,
    pub end_latlng: Option<Vec<f64>>,
    pub average_speed: Option<f64>,
    pub max_speed: Option<f64>,
    pub average_cadence: Option<f64>,
    /// Device-recorded temperature (not the derived outdoor temperature)
    pub average_temp: Option<f64>,
    pub has_heartrate: Option<bool>,
    pub average_heartrate: Option<f64>,
    pub max_heartrate: Option<f64>,
    pub heartrate_opt_out: Option<bool>,
    pub display_hide_heartrate_option: Option<bool>,
    pub elev_high: Option<f64>,
    pub elev_low: Option<f64>,
    pub upload_id: Option<i64>,
    pub upload_id_str: Option<String>,
    pub external_id: Option<String>,
    pub from_accepted_tag: Option<bool>,
    pub pr_count: Option<i32>,
    pub total_photo_count: Option<i32>,
    pub has_kudoed: Option<bool>,
}

/// Athlete reference embedded in an activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AthleteRef {
    pub id: i64,
    pub resource_state: Option<i32>,
}

/// Map summary embedded in an activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityMap {
    pub id: Option<String>,
    pub summary_polyline: Option<String>,
    pub resource_state: Option<i32>,
}

/// A stored activity still missing its derived outdoor temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureCandidate {
    pub id: i64,
    /// Raw stored start coordinate (any JSON value)
    pub start_latlng: Option<serde_json::Value>,
    pub start_date: DateTime<Utc>,
    /// Elapsed time in seconds
    pub elapsed_time: Option<i64>,
}

impl TemperatureCandidate {
    /// Start coordinate as `(latitude, longitude)`, if exactly two numbers
    /// were stored.
    pub fn start_coordinates(&self) -> Option<(f64, f64)> {
        match self.start_latlng.as_ref()?.as_array()?.as_slice() {
            [lat, lng] => Some((lat.as_f64()?, lng.as_f64()?)),
            _ => None,
        }
    }

    /// Activity start and end instants. `None` when the stored elapsed time
    /// puts the end outside the representable range.
    pub fn window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let elapsed = TimeDelta::try_seconds(self.elapsed_time.unwrap_or(0).max(0))?;
        let end = self.start_date.checked_add_signed(elapsed)?;
        Some((self.start_date, end))
    }
}
