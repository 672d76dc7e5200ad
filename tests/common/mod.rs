// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use activity_pipeline::db::PostgresDb;
use activity_pipeline::models::Activity;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Connection string for the PostgreSQL integration tests, if configured.
#[allow(dead_code)]
pub fn database_url() -> Option<String> {
    std::env::var("TEST_DATABASE_URL").ok()
}

/// Skip test with message if no test database is configured.
#[macro_export]
macro_rules! require_database {
    () => {
        if crate::common::database_url().is_none() {
            eprintln!("⚠️  Skipping: TEST_DATABASE_URL not set");
            return;
        }
    };
}

/// Connect to the test database and apply the migration.
#[allow(dead_code)]
pub async fn test_db() -> PostgresDb {
    let url = database_url().expect("TEST_DATABASE_URL");
    let db = PostgresDb::connect(&url)
        .await
        .expect("Failed to connect to test database");
    db.migrate().await.expect("Failed to migrate test database");
    db
}

/// Strava summary activity JSON with realistic values.
#[allow(dead_code)]
pub fn activity_json(id: i64, name: &str) -> Value {
    json!({
        "resource_state": 2,
        "athlete": {"id": 134815, "resource_state": 1},
        "name": name,
        "distance": 28099.0,
        "moving_time": 4207,
        "elapsed_time": 4410,
        "total_elevation_gain": 516.0,
        "type": "Ride",
        "sport_type": "MountainBikeRide",
        "workout_type": null,
        "id": id,
        "start_date": "2024-05-04T14:30:00Z",
        "start_date_local": "2024-05-04T07:30:00Z",
        "timezone": "(GMT-08:00) America/Los_Angeles",
        "utc_offset": -25200.0,
        "location_city": null,
        "location_state": null,
        "location_country": "United States",
        "achievement_count": 0,
        "kudos_count": 19,
        "comment_count": 0,
        "athlete_count": 1,
        "photo_count": 0,
        "map": {"id": format!("a{}", id), "summary_polyline": "ki{eFvqfiVqAWQIGEEKAYJgBVqDJ", "resource_state": 2},
        "trainer": false,
        "commute": false,
        "manual": false,
        "private": false,
        "visibility": "everyone",
        "flagged": false,
        "gear_id": "b12345678987654321",
        "start_latlng": [37.39, -122.08],
        "end_latlng": [37.4, -122.09],
        "average_speed": 6.679,
        "max_speed": 18.5,
        "average_cadence": 78.5,
        "average_temp": 19.0,
        "has_heartrate": true,
        "average_heartrate": 140.3,
        "max_heartrate": 178.0,
        "heartrate_opt_out": false,
        "display_hide_heartrate_option": true,
        "elev_high": 446.6,
        "elev_low": 17.2,
        "upload_id": 14545,
        "upload_id_str": "14545",
        "external_id": "garmin_push_12345678987654321",
        "from_accepted_tag": false,
        "pr_count": 0,
        "total_photo_count": 1,
        "has_kudoed": false
    })
}

/// Parsed form of [`activity_json`].
#[allow(dead_code)]
pub fn activity(id: i64, name: &str) -> Activity {
    serde_json::from_value(activity_json(id, name)).expect("activity json")
}

/// Mount one listing page on the mock Strava server, expecting it to be
/// requested exactly `times` times.
#[allow(dead_code)]
pub async fn mount_page(server: &MockServer, page: u32, body: Vec<Value>, times: u64) {
    Mock::given(method("GET"))
        .and(path("/athlete/activities"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(body)))
        .expect(times)
        .mount(server)
        .await;
}
