// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory activity store.
//!
//! Mirrors the PostgreSQL semantics (unique id, nullable `outdoor_temp`) so
//! the ingester and the backfill can be exercised without a database.

use crate::db::ActivityStore;
use crate::error::{AppError, Result};
use crate::models::{Activity, TemperatureCandidate};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct StoredActivity {
    activity: Activity,
    outdoor_temp: Option<f64>,
}

#[derive(Debug, Default)]
struct State {
    rows: BTreeMap<i64, StoredActivity>,
    rejected_ids: HashSet<i64>,
    writes: usize,
}

/// In-memory store shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryDb {
    state: Arc<Mutex<State>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every insert of `id` fail, as a constraint violation would.
    pub fn reject_inserts_for(&self, id: i64) {
        self.state().rejected_ids.insert(id);
    }

    /// Seed a row directly, bypassing write accounting.
    pub fn seed(&self, activity: Activity, outdoor_temp: Option<f64>) {
        self.state().rows.insert(
            activity.id,
            StoredActivity {
                activity,
                outdoor_temp,
            },
        );
    }

    pub fn get(&self, id: i64) -> Option<Activity> {
        self.state().rows.get(&id).map(|r| r.activity.clone())
    }

    pub fn outdoor_temp(&self, id: i64) -> Option<f64> {
        self.state().rows.get(&id).and_then(|r| r.outdoor_temp)
    }

    pub fn len(&self) -> usize {
        self.state().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of inserts, replacements and updates performed so far.
    pub fn write_count(&self) -> usize {
        self.state().writes
    }
}

fn insert_row(state: &mut State, activity: &Activity) -> Result<()> {
    if state.rejected_ids.contains(&activity.id) {
        return Err(AppError::Database(format!(
            "insert rejected for activity {}",
            activity.id
        )));
    }
    if state.rows.contains_key(&activity.id) {
        return Err(AppError::Database(format!(
            "duplicate key value violates unique constraint (id={})",
            activity.id
        )));
    }
    state.rows.insert(
        activity.id,
        StoredActivity {
            activity: activity.clone(),
            outdoor_temp: None,
        },
    );
    state.writes += 1;
    Ok(())
}

#[async_trait]
impl ActivityStore for MemoryDb {
    async fn activity_exists(&self, id: i64) -> Result<bool> {
        Ok(self.state().rows.contains_key(&id))
    }

    async fn insert_activity(&self, activity: &Activity) -> Result<()> {
        insert_row(&mut self.state(), activity)
    }

    async fn replace_activity(&self, activity: &Activity) -> Result<()> {
        let mut state = self.state();
        let previous = state.rows.remove(&activity.id);

        if let Err(e) = insert_row(&mut state, activity) {
            // Roll back the delete.
            if let Some(row) = previous {
                state.rows.insert(activity.id, row);
            }
            return Err(e);
        }
        Ok(())
    }

    async fn activities_missing_outdoor_temp(&self) -> Result<Vec<TemperatureCandidate>> {
        let mut candidates: Vec<TemperatureCandidate> = self
            .state()
            .rows
            .values()
            .filter(|r| r.outdoor_temp.is_none())
            .map(|r| TemperatureCandidate {
                id: r.activity.id,
                start_latlng: Some(
                    r.activity
                        .start_latlng
                        .clone()
                        .map(serde_json::Value::from)
                        .unwrap_or(serde_json::Value::Null),
                ),
                start_date: r.activity.start_date,
                elapsed_time: r.activity.elapsed_time,
            })
            .collect();
        candidates.sort_by_key(|c| c.start_date);
        Ok(candidates)
    }

    async fn set_outdoor_temp(&self, id: i64, outdoor_temp: f64) -> Result<()> {
        let mut guard = self.state();
        let state = &mut *guard;
        let row = state.rows.get_mut(&id).ok_or_else(|| {
            AppError::Database(format!("No stored activity {} to update", id))
        })?;
        row.outdoor_temp = Some(outdoor_temp);
        state.writes += 1;
        Ok(())
    }
}
