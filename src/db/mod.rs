// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (PostgreSQL, plus an in-memory store for tests).

pub mod columns;
pub mod memory;
pub mod postgres;

pub use memory::MemoryDb;
pub use postgres::PostgresDb;

use crate::error::Result;
use crate::models::{Activity, TemperatureCandidate};
use async_trait::async_trait;

/// Table names as constants.
pub mod tables {
    pub const ACTIVITIES: &str = "activities";
}

/// Storage operations used by the ingester and the temperature backfill.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Whether an activity with this id is stored.
    async fn activity_exists(&self, id: i64) -> Result<bool>;

    /// Insert a new activity row.
    async fn insert_activity(&self, activity: &Activity) -> Result<()>;

    /// Delete the stored row for `activity.id` and insert the fresh one as a
    /// single unit.
    async fn replace_activity(&self, activity: &Activity) -> Result<()>;

    /// Activities whose `outdoor_temp` is still unset.
    async fn activities_missing_outdoor_temp(&self) -> Result<Vec<TemperatureCandidate>>;

    /// Record the derived outdoor temperature for an activity. Fails when no
    /// row has this id.
    async fn set_outdoor_temp(&self, id: i64, outdoor_temp: f64) -> Result<()>;
}
