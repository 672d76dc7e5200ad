// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Outdoor temperature backfill.
//!
//! Scans stored activities whose `outdoor_temp` is unset, fetches the hourly
//! temperature around each start coordinate and writes back the average over
//! the activity window.

use crate::db::ActivityStore;
use crate::error::Result;
use crate::models::TemperatureCandidate;
use crate::services::weather::{MatchMode, WeatherClient, WeatherSource};
use chrono::{DateTime, Utc};

/// What happened to a single candidate activity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackfillOutcome {
    Updated(f64),
    /// No usable start coordinate or activity window
    Skipped,
    /// Weather data did not cover the activity window
    NoData,
    Failed,
}

/// Counters for one backfill run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub candidates: usize,
    pub updated: usize,
    pub skipped: usize,
    pub no_data: usize,
    pub failed: usize,
}

impl BackfillReport {
    fn record(&mut self, outcome: BackfillOutcome) {
        match outcome {
            BackfillOutcome::Updated(_) => self.updated += 1,
            BackfillOutcome::Skipped => self.skipped += 1,
            BackfillOutcome::NoData => self.no_data += 1,
            BackfillOutcome::Failed => self.failed += 1,
        }
    }
}

/// Fills the derived outdoor temperature for stored activities.
pub struct TemperatureBackfill<S> {
    weather: WeatherClient,
    store: S,
    match_mode: MatchMode,
}

impl<S: ActivityStore> TemperatureBackfill<S> {
    pub fn new(weather: WeatherClient, store: S) -> Self {
        Self {
            weather,
            store,
            match_mode: MatchMode::default(),
        }
    }

    pub fn match_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }

    /// Process every activity missing an outdoor temperature, treating `now`
    /// as the current time for endpoint selection.
    ///
    /// Failing to enumerate candidates aborts; per-activity failures are
    /// logged and skipped.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<BackfillReport> {
        let candidates = self.store.activities_missing_outdoor_temp().await?;
        tracing::info!(
            count = candidates.len(),
            "Activities missing outdoor temperature"
        );

        let mut report = BackfillReport {
            candidates: candidates.len(),
            ..Default::default()
        };

        for candidate in &candidates {
            let outcome = self.backfill_one(candidate, now).await;
            report.record(outcome);
        }

        Ok(report)
    }

    async fn backfill_one(
        &self,
        candidate: &TemperatureCandidate,
        now: DateTime<Utc>,
    ) -> BackfillOutcome {
        let id = candidate.id;

        let Some((latitude, longitude)) = candidate.start_coordinates() else {
            tracing::debug!(activity_id = id, "No start coordinate, skipping");
            return BackfillOutcome::Skipped;
        };

        let Some((start, end)) = candidate.window() else {
            tracing::warn!(
                activity_id = id,
                elapsed_time = candidate.elapsed_time,
                "Elapsed time out of range, skipping"
            );
            return BackfillOutcome::Skipped;
        };
        let source = WeatherSource::select(start, end, now);
        tracing::debug!(
            activity_id = id,
            archive = source.is_archive(),
            "Fetching hourly temperatures"
        );

        let series = match self
            .weather
            .hourly_temperatures(latitude, longitude, &source)
            .await
        {
            Ok(series) => series,
            Err(e) => {
                tracing::error!(
                    activity_id = id,
                    error = %e,
                    "Error fetching weather data"
                );
                return BackfillOutcome::Failed;
            }
        };

        if series.is_empty() {
            tracing::warn!(activity_id = id, "No temperature data available");
            return BackfillOutcome::NoData;
        }

        let Some(outdoor_temp) = series.average_in_window(start, end, self.match_mode) else {
            tracing::warn!(activity_id = id, "No relevant temperature data available");
            return BackfillOutcome::NoData;
        };

        match self.store.set_outdoor_temp(id, outdoor_temp).await {
            Ok(()) => {
                tracing::info!(activity_id = id, outdoor_temp, "Outdoor temperature stored");
                BackfillOutcome::Updated(outdoor_temp)
            }
            Err(e) => {
                tracing::error!(
                    activity_id = id,
                    error = %e,
                    "Error storing outdoor temperature"
                );
                BackfillOutcome::Failed
            }
        }
    }
}
