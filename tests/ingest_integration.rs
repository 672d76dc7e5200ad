// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Integration tests for activity ingestion against a mock Strava API.

#![recursion_limit = "256"]

use activity_pipeline::db::MemoryDb;
use activity_pipeline::services::{ActivityIngester, IngestReport, StravaClient};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{activity, activity_json, mount_page};

fn ingester(server: &MockServer, db: &MemoryDb) -> ActivityIngester<MemoryDb> {
    ActivityIngester::new(StravaClient::new(server.uri()), db.clone()).per_page(2)
}

#[tokio::test]
async fn test_ingest_inserts_every_page_until_empty() {
    let server = MockServer::start().await;
    mount_page(&server, 1, vec![activity_json(1, "One"), activity_json(2, "Two")], 1).await;
    mount_page(&server, 2, vec![activity_json(3, "Three")], 1).await;
    mount_page(&server, 3, vec![], 1).await;
    mount_page(&server, 4, vec![activity_json(4, "Never")], 0).await;

    let db = MemoryDb::new();
    let report = ingester(&server, &db).run("token").await.unwrap();

    assert_eq!(
        report,
        IngestReport {
            pages: 2,
            fetched: 3,
            inserted: 3,
            replaced: 0,
            skipped: 0,
            failed: 0,
        }
    );
    assert_eq!(db.len(), 3);
    assert!(db.get(4).is_none());
}

#[tokio::test]
async fn test_empty_first_page_makes_no_writes() {
    let server = MockServer::start().await;
    mount_page(&server, 1, vec![], 1).await;
    mount_page(&server, 2, vec![activity_json(1, "Never")], 0).await;

    let db = MemoryDb::new();
    let report = ingester(&server, &db).run("token").await.unwrap();

    assert_eq!(report, IngestReport::default());
    assert!(db.is_empty());
    assert_eq!(db.write_count(), 0);
}

#[tokio::test]
async fn test_requests_carry_bearer_token_and_page_size() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/athlete/activities"))
        .and(header("authorization", "Bearer s3cret"))
        .and(query_param("per_page", "2"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let db = MemoryDb::new();
    ingester(&server, &db).run("s3cret").await.unwrap();
}

#[tokio::test]
async fn test_second_run_without_update_is_idempotent() {
    let server = MockServer::start().await;
    mount_page(&server, 1, vec![activity_json(1, "One"), activity_json(2, "Two")], 2).await;
    mount_page(&server, 2, vec![], 2).await;

    let db = MemoryDb::new();
    ingester(&server, &db).run("token").await.unwrap();
    let first = (db.get(1), db.get(2));
    let writes = db.write_count();

    let report = ingester(&server, &db).run("token").await.unwrap();

    assert_eq!(report.skipped, 2);
    assert_eq!(report.inserted, 0);
    assert_eq!(report.replaced, 0);
    assert_eq!(db.len(), 2);
    assert_eq!(db.write_count(), writes);
    assert_eq!((db.get(1), db.get(2)), first);
}

#[tokio::test]
async fn test_skip_leaves_stored_values_untouched() {
    let server = MockServer::start().await;
    mount_page(&server, 1, vec![activity_json(1, "Renamed on Strava")], 1).await;
    mount_page(&server, 2, vec![], 1).await;

    let db = MemoryDb::new();
    db.seed(activity(1, "Original"), Some(18.25));

    let report = ingester(&server, &db).run("token").await.unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(db.get(1).unwrap().name, "Original");
    assert_eq!(db.outdoor_temp(1), Some(18.25));
}

#[tokio::test]
async fn test_update_existing_replaces_exactly_one_row() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        vec![activity_json(1, "Renamed on Strava"), activity_json(2, "New")],
        1,
    )
    .await;
    mount_page(&server, 2, vec![], 1).await;

    let db = MemoryDb::new();
    db.seed(activity(1, "Original"), Some(18.25));

    let report = ingester(&server, &db)
        .update_existing(true)
        .run("token")
        .await
        .unwrap();

    assert_eq!(report.replaced, 1);
    assert_eq!(report.inserted, 1);
    assert_eq!(db.len(), 2);
    assert_eq!(db.get(1).unwrap().name, "Renamed on Strava");
    // Wholesale replacement: the derived attribute starts over.
    assert_eq!(db.outdoor_temp(1), None);
}

#[tokio::test]
async fn test_failed_insert_does_not_stop_the_page() {
    let server = MockServer::start().await;
    mount_page(&server, 1, vec![activity_json(1, "One"), activity_json(2, "Two")], 1).await;
    mount_page(&server, 2, vec![activity_json(3, "Three")], 1).await;
    mount_page(&server, 3, vec![], 1).await;

    let db = MemoryDb::new();
    db.reject_inserts_for(1);

    let report = ingester(&server, &db).run("token").await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.inserted, 2);
    assert!(db.get(1).is_none());
    assert!(db.get(2).is_some());
    assert!(db.get(3).is_some());
}

#[tokio::test]
async fn test_duplicate_id_within_run_is_stored_once() {
    let server = MockServer::start().await;
    mount_page(&server, 1, vec![activity_json(7, "First"), activity_json(7, "Again")], 1).await;
    mount_page(&server, 2, vec![], 1).await;

    let db = MemoryDb::new();
    let report = ingester(&server, &db).run("token").await.unwrap();

    assert_eq!(report.inserted, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(db.len(), 1);
    assert_eq!(db.get(7).unwrap().name, "First");
}

#[tokio::test]
async fn test_unauthorized_aborts_with_token_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/athlete/activities"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "Authorization Error",
            "errors": [{"resource": "Athlete", "field": "access_token", "code": "invalid"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let db = MemoryDb::new();
    let err = ingester(&server, &db).run("expired").await.unwrap_err();

    assert!(err.is_strava_token_error());
    assert!(db.is_empty());
}

#[tokio::test]
async fn test_rate_limit_aborts_after_partial_progress() {
    let server = MockServer::start().await;
    mount_page(&server, 1, vec![activity_json(1, "One"), activity_json(2, "Two")], 1).await;
    Mock::given(method("GET"))
        .and(path("/athlete/activities"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let db = MemoryDb::new();
    let err = ingester(&server, &db).run("token").await.unwrap_err();

    assert!(err.is_rate_limited());
    // Rows from the first page are kept; there is no run-wide transaction.
    assert_eq!(db.len(), 2);
}
