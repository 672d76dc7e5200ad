// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity ingestion service.
//!
//! Handles the core workflow:
//! 1. Fetch a page of activities from Strava
//! 2. For each activity, check whether it is already stored
//! 3. Insert new activities; skip or replace known ones depending on
//!    update-mode
//! 4. Stop at the first empty page

use crate::db::ActivityStore;
use crate::error::Result;
use crate::models::Activity;
use crate::services::StravaClient;

/// Page size used when listing activities (Strava's maximum).
pub const DEFAULT_PER_PAGE: u32 = 200;

/// What happened to a single fetched activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Inserted,
    Replaced,
    Skipped,
    Failed,
}

/// Counters for one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Non-empty pages processed
    pub pages: u32,
    pub fetched: usize,
    pub inserted: usize,
    pub replaced: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl IngestReport {
    fn record(&mut self, outcome: IngestOutcome) {
        match outcome {
            IngestOutcome::Inserted => self.inserted += 1,
            IngestOutcome::Replaced => self.replaced += 1,
            IngestOutcome::Skipped => self.skipped += 1,
            IngestOutcome::Failed => self.failed += 1,
        }
    }
}

/// Pages through the athlete's activities and stores them.
pub struct ActivityIngester<S> {
    strava: StravaClient,
    store: S,
    per_page: u32,
    update_existing: bool,
}

impl<S: ActivityStore> ActivityIngester<S> {
    pub fn new(strava: StravaClient, store: S) -> Self {
        Self {
            strava,
            store,
            per_page: DEFAULT_PER_PAGE,
            update_existing: false,
        }
    }

    /// Replace already-stored activities instead of skipping them.
    pub fn update_existing(mut self, update_existing: bool) -> Self {
        self.update_existing = update_existing;
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Ingest every activity visible to `access_token`.
    ///
    /// A listing or existence-check failure aborts the run; a failed write of
    /// one activity is logged and the run continues.
    pub async fn run(&self, access_token: &str) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        let mut page = 1u32;

        loop {
            let activities = self
                .strava
                .list_activities(access_token, page, self.per_page)
                .await?;

            if activities.is_empty() {
                tracing::info!(page, "Empty page, ingestion complete");
                break;
            }

            tracing::info!(page, count = activities.len(), "Fetched activity page");
            report.pages += 1;
            report.fetched += activities.len();

            for (index, activity) in activities.iter().enumerate() {
                let position = (page as usize - 1) * self.per_page as usize + index + 1;
                let outcome = self.ingest_one(activity, position).await?;
                report.record(outcome);
            }

            page += 1;
        }

        Ok(report)
    }

    /// Store one activity. `position` is the 1-indexed running count used in
    /// log lines.
    async fn ingest_one(&self, activity: &Activity, position: usize) -> Result<IngestOutcome> {
        let exists = self.store.activity_exists(activity.id).await?;

        if exists && !self.update_existing {
            tracing::debug!(
                activity_id = activity.id,
                position,
                "Activity already tracked, skipping"
            );
            return Ok(IngestOutcome::Skipped);
        }

        let (write, outcome) = if exists {
            tracing::info!(
                activity_id = activity.id,
                position,
                "Found activity that's already tracked, updating"
            );
            (
                self.store.replace_activity(activity).await,
                IngestOutcome::Replaced,
            )
        } else {
            tracing::info!(
                activity_id = activity.id,
                position,
                "Inserting brand new activity"
            );
            (
                self.store.insert_activity(activity).await,
                IngestOutcome::Inserted,
            )
        };

        match write {
            Ok(()) => Ok(outcome),
            Err(e) => {
                tracing::error!(
                    activity_id = activity.id,
                    position,
                    error = %e,
                    "Error storing activity"
                );
                Ok(IngestOutcome::Failed)
            }
        }
    }
}
