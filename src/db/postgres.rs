// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PostgreSQL-backed activity store.
//!
//! Provides:
//! - Schema migration (table creation, `outdoor_temp` column)
//! - Existence checks, inserts and replacements for ingested activities
//! - The `outdoor_temp IS NULL` scan and write-back for the weather backfill

use crate::db::columns::{create_table_sql, insert_activity_query};
use crate::db::ActivityStore;
use crate::error::{AppError, Result};
use crate::models::{Activity, TemperatureCandidate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use std::time::Duration;

/// Each subcommand works over a single connection.
const MAX_CONNECTIONS: u32 = 1;
const ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// PostgreSQL database client.
#[derive(Clone)]
pub struct PostgresDb {
    pool: PgPool,
}

impl PostgresDb {
    /// Connect to the database behind `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to PostgreSQL: {}", e)))?;

        tracing::info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Release the connection. Safe to call on both success and error paths.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("PostgreSQL connection released");
    }

    /// Create the `activities` table if needed and add the nullable
    /// `outdoor_temp` column if it is absent. Idempotent.
    pub async fn migrate(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(&create_table_sql()).execute(&mut *tx).await?;

        sqlx::query(
            r#"
            ALTER TABLE activities
            ADD COLUMN IF NOT EXISTS outdoor_temp double precision
            "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct CandidateRow {
    id: i64,
    start_latlng: Option<Json<serde_json::Value>>,
    start_date: DateTime<Utc>,
    elapsed_time: Option<i64>,
}

impl From<CandidateRow> for TemperatureCandidate {
    fn from(row: CandidateRow) -> Self {
        Self {
            id: row.id,
            start_latlng: row.start_latlng.map(|Json(v)| v),
            start_date: row.start_date,
            elapsed_time: row.elapsed_time,
        }
    }
}

#[async_trait]
impl ActivityStore for PostgresDb {
    async fn activity_exists(&self, id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM activities WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn insert_activity(&self, activity: &Activity) -> Result<()> {
        insert_activity_query(activity)
            .build()
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn replace_activity(&self, activity: &Activity) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(activity.id)
            .execute(&mut *tx)
            .await?;

        insert_activity_query(activity)
            .build()
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn activities_missing_outdoor_temp(&self) -> Result<Vec<TemperatureCandidate>> {
        let rows: Vec<CandidateRow> = sqlx::query_as(
            r#"
            SELECT id,
                   start_latlng::jsonb AS start_latlng,
                   start_date,
                   elapsed_time::bigint AS elapsed_time
            FROM activities
            WHERE outdoor_temp IS NULL
              AND start_date IS NOT NULL
            ORDER BY start_date
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TemperatureCandidate::from).collect())
    }

    async fn set_outdoor_temp(&self, id: i64, outdoor_temp: f64) -> Result<()> {
        let result = sqlx::query("UPDATE activities SET outdoor_temp = $1 WHERE id = $2")
            .bind(outdoor_temp)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Database(format!(
                "No stored activity {} to update",
                id
            )));
        }
        Ok(())
    }
}
