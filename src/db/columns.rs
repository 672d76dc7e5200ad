// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Column table for the `activities` relation.
//!
//! Every stored column is paired with the activity field that feeds it, so the
//! INSERT statement and its bind values are generated from one list.

use crate::db::tables;
use crate::models::Activity;
use chrono::{DateTime, Utc};
use sqlx::postgres::Postgres;
use sqlx::QueryBuilder;

/// A typed value bound to one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Int(Option<i32>),
    BigInt(Option<i64>),
    Float(Option<f64>),
    Text(Option<String>),
    Bool(Option<bool>),
    Timestamp(Option<DateTime<Utc>>),
    Json(Option<serde_json::Value>),
}

impl ColumnValue {
    /// SQL type used when creating the column.
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnValue::Int(_) => "INTEGER",
            ColumnValue::BigInt(_) => "BIGINT",
            ColumnValue::Float(_) => "DOUBLE PRECISION",
            ColumnValue::Text(_) => "TEXT",
            ColumnValue::Bool(_) => "BOOLEAN",
            ColumnValue::Timestamp(_) => "TIMESTAMPTZ",
            ColumnValue::Json(_) => "JSONB",
        }
    }

    fn push_bind(self, builder: &mut QueryBuilder<'_, Postgres>) {
        match self {
            ColumnValue::Int(v) => builder.push_bind(v),
            ColumnValue::BigInt(v) => builder.push_bind(v),
            ColumnValue::Float(v) => builder.push_bind(v),
            ColumnValue::Text(v) => builder.push_bind(v),
            ColumnValue::Bool(v) => builder.push_bind(v),
            ColumnValue::Timestamp(v) => builder.push_bind(v),
            ColumnValue::Json(v) => builder.push_bind(v.map(sqlx::types::Json)),
        };
    }
}

/// Encode a coordinate pair the way it is stored (`[lat, lng]`, `[]` or `null`).
fn latlng_json(latlng: &Option<Vec<f64>>) -> Option<serde_json::Value> {
    Some(match latlng {
        Some(pair) => serde_json::Value::from(pair.clone()),
        None => serde_json::Value::Null,
    })
}

/// Named columns and their values for one activity.
pub fn activity_columns(a: &Activity) -> Vec<(&'static str, ColumnValue)> {
    use ColumnValue::*;

    vec![
        ("resource_state", Int(a.resource_state)),
        ("athlete.id", BigInt(Some(a.athlete.id))),
        ("athlete.resource_state", Int(a.athlete.resource_state)),
        ("name", Text(Some(a.name.clone()))),
        ("distance", Float(a.distance)),
        ("moving_time", BigInt(a.moving_time)),
        ("elapsed_time", BigInt(a.elapsed_time)),
        ("total_elevation_gain", Float(a.total_elevation_gain)),
        ("type", Text(a.activity_type.clone())),
        ("sport_type", Text(a.sport_type.clone())),
        ("workout_type", Int(a.workout_type)),
        ("id", BigInt(Some(a.id))),
        ("start_date", Timestamp(Some(a.start_date))),
        ("start_date_local", Text(a.start_date_local.clone())),
        ("timezone", Text(a.timezone.clone())),
        ("utc_offset", Float(a.utc_offset)),
        ("location_city", Text(a.location_city.clone())),
        ("location_state", Text(a.location_state.clone())),
        ("location_country", Text(a.location_country.clone())),
        ("achievement_count", Int(a.achievement_count)),
        ("kudos_count", Int(a.kudos_count)),
        ("comment_count", Int(a.comment_count)),
        ("athlete_count", Int(a.athlete_count)),
        ("photo_count", Int(a.photo_count)),
        ("map.id", Text(a.map.id.clone())),
        ("map.summary_polyline", Text(a.map.summary_polyline.clone())),
        ("map.resource_state", Int(a.map.resource_state)),
        ("trainer", Bool(a.trainer)),
        ("commute", Bool(a.commute)),
        ("manual", Bool(a.manual)),
        ("private", Bool(a.private)),
        ("visibility", Text(a.visibility.clone())),
        ("flagged", Bool(a.flagged)),
        ("gear_id", Text(a.gear_id.clone())),
        ("start_latlng", Json(latlng_json(&a.start_latlng))),
        ("end_latlng", Json(latlng_json(&a.end_latlng))),
        ("average_speed", Float(a.average_speed)),
        ("max_speed", Float(a.max_speed)),
        ("average_cadence", Float(a.average_cadence)),
        ("average_temp", Float(a.average_temp)),
        ("has_heartrate", Bool(a.has_heartrate)),
        ("average_heartrate", Float(a.average_heartrate)),
        ("max_heartrate", Float(a.max_heartrate)),
        ("heartrate_opt_out", Bool(a.heartrate_opt_out)),
        (
            "display_hide_heartrate_option",
            Bool(a.display_hide_heartrate_option),
        ),
        ("elev_high", Float(a.elev_high)),
        ("elev_low", Float(a.elev_low)),
        ("upload_id", BigInt(a.upload_id)),
        ("upload_id_str", Text(a.upload_id_str.clone())),
        ("external_id", Text(a.external_id.clone())),
        ("from_accepted_tag", Bool(a.from_accepted_tag)),
        ("pr_count", Int(a.pr_count)),
        ("total_photo_count", Int(a.total_photo_count)),
        ("has_kudoed", Bool(a.has_kudoed)),
    ]
}

/// Quote a column name for PostgreSQL (names contain dots).
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Build `INSERT INTO activities (...) VALUES (...)` for one activity.
pub fn insert_activity_query(activity: &Activity) -> QueryBuilder<'static, Postgres> {
    let columns = activity_columns(activity);

    let mut builder = QueryBuilder::new(format!("INSERT INTO {} (", tables::ACTIVITIES));
    let names: Vec<String> = columns.iter().map(|(name, _)| quote_ident(name)).collect();
    builder.push(names.join(", "));
    builder.push(") VALUES (");

    for (i, (_, value)) in columns.into_iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        value.push_bind(&mut builder);
    }
    builder.push(")");
    builder
}

/// `CREATE TABLE IF NOT EXISTS` statement derived from the column table.
pub fn create_table_sql() -> String {
    let template = Activity::default();

    let defs: Vec<String> = activity_columns(&template)
        .iter()
        .map(|(name, value)| {
            if *name == "id" {
                format!("{} BIGINT PRIMARY KEY", quote_ident(name))
            } else {
                format!("{} {}", quote_ident(name), value.sql_type())
            }
        })
        .collect();

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        tables::ACTIVITIES,
        defs.join(",\n    ")
    )
}
