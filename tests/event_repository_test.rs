//! These tests need a PostgreSQL server reachable through `DATABASE_URL`.
//! Run them with `cargo test -- --ignored`.

use std::path::Path;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use sqlx::PgPool;
use telemetry_server::api::{build_router, AppState};
use telemetry_server::db;
use telemetry_server::models::NewEvent;
use telemetry_server::repositories::EventRepository;
use telemetry_server::services::{DatabaseSink, EventRecorder};
use tower::ServiceExt;

fn new_event(event_type: &str, properties: Option<Value>) -> NewEvent {
    NewEvent {
        event_type: Some(event_type.to_string()),
        user_id: Some("tester".to_string()),
        properties,
        captured_at: Utc::now(),
    }
}

fn app_with(pool: &PgPool) -> Router {
    let state = AppState {
        pool: Some(pool.clone()),
        recorder: EventRecorder::new().with_sink(DatabaseSink::new(pool.clone())),
    };
    build_router(state, Path::new("does/not/exist"))
}

async fn request_json(app: Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_ensure_schema_is_idempotent(pool: PgPool) {
    db::ensure_schema(&pool).await.unwrap();
    db::ensure_schema(&pool).await.unwrap();

    let (tables,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'events'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_eq!(tables, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_properties_round_trip(pool: PgPool) {
    let repo = EventRepository::new(&pool);
    let properties = json!({"nested": {"list": [1, "two", null]}, "flag": true});

    let id = repo
        .insert(&new_event("task.started", Some(properties.clone())))
        .await
        .unwrap();

    let recent = repo.list_recent_today(20).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, id);
    assert_eq!(recent[0].properties, Some(properties));
    assert_eq!(recent[0].user_id.as_deref(), Some("tester"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_recent_is_limited_newest_first_and_today_only(pool: PgPool) {
    let repo = EventRepository::new(&pool);

    let mut old = new_event("task.old", None);
    old.captured_at = Utc::now() - Duration::days(3);
    repo.insert(&old).await.unwrap();

    for n in 0..25 {
        repo.insert(&new_event(&format!("task.{n}"), None)).await.unwrap();
    }

    let recent = repo.list_recent_today(20).await.unwrap();

    assert_eq!(recent.len(), 20);
    assert_eq!(recent[0].event_type.as_deref(), Some("task.24"));
    assert!(recent.windows(2).all(|pair| pair[0].id > pair[1].id));
    assert!(recent.iter().all(|e| e.event_type.as_deref() != Some("task.old")));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_capture_then_list_via_http(pool: PgPool) {
    let app = app_with(&pool);

    let payload = json!({
        "event": "task.feedback",
        "user_id": "u-9",
        "properties": {"feedbackType": "thumbs_up"}
    });
    let (status, ack) =
        request_json(app.clone(), Method::POST, "/capture/", &payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({"status": 1}));

    let (status, events) = request_json(app, Method::GET, "/api/events", "").await;
    assert_eq!(status, StatusCode::OK);

    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["event"], "task.feedback");
    assert_eq!(events[0]["event_type"], "task.feedback");
    assert_eq!(events[0]["user_id"], "u-9");
    assert_eq!(events[0]["properties"], json!({"feedbackType": "thumbs_up"}));
    assert_eq!(events[0]["timestamp"], events[0]["captured_at"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_batch_persists_in_submitted_order(pool: PgPool) {
    let app = app_with(&pool);

    let payload = json!({"batch": [{"event": "a"}, {"event": "b"}, {"event": "c"}]});
    let (status, _) = request_json(app, Method::POST, "/batch/", &payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let rows: Vec<(i32, Option<String>)> =
        sqlx::query_as("SELECT id, event_type FROM events ORDER BY id ASC")
            .fetch_all(&pool)
            .await
            .unwrap();
    let types: Vec<_> = rows.into_iter().filter_map(|(_, t)| t).collect();

    assert_eq!(types, vec!["a", "b", "c"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_malformed_capture_persists_nothing(pool: PgPool) {
    let app = app_with(&pool);

    let (status, _) = request_json(app, Method::POST, "/capture/", "{oops").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_read_failures_with_live_pool(pool: PgPool) {
    sqlx::query("DROP TABLE events").execute(&pool).await.unwrap();
    let app = app_with(&pool);

    let (status, _) = request_json(app.clone(), Method::GET, "/stats", "").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, events) = request_json(app, Method::GET, "/api/events", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events, json!([]));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_stats_over_seeded_window(pool: PgPool) {
    let repo = EventRepository::new(&pool);
    for _ in 0..3 {
        repo.insert(&new_event("task.option_selected", None)).await.unwrap();
    }
    for _ in 0..2 {
        repo.insert(&new_event("task.options_ignored", None)).await.unwrap();
    }
    repo.insert(&new_event(
        "task.feedback",
        Some(json!({"feedbackType": "thumbs_up"})),
    ))
    .await
    .unwrap();

    let mut stale = new_event("task.option_selected", None);
    stale.captured_at = Utc::now() - Duration::days(40);
    repo.insert(&stale).await.unwrap();

    let (status, stats) = request_json(app_with(&pool), Method::GET, "/stats", "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["accepted"]["option_selected"], 3);
    assert_eq!(stats["rejected"]["options_ignored"], 2);
    assert_eq!(stats["accepted"]["thumbs_up"], 1);
    assert_eq!(stats["rejected"]["thumbs_down"], 0);

    let total: u64 = stats["totals"]
        .as_object()
        .unwrap()
        .values()
        .map(|v| v.as_u64().unwrap())
        .sum();
    assert_eq!(total, 6);
}
