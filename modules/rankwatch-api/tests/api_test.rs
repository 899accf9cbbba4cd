//! REST surface tests against MemoryStore + MockFetcher, driven through the
//! router with `oneshot`. No network, no database.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use rankwatch_api::{router, AppState};
use rankwatch_common::TrackingConfig;
use rankwatch_tracker::testing::MockFetcher;
use rankwatch_tracker::{CheckSettings, CheckTrigger, MemoryStore, RankChecker, RankStore};

struct Harness {
    app: Router,
    store: Arc<MemoryStore>,
}

fn harness(fetcher: MockFetcher) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let checker = Arc::new(RankChecker::new(
        store.clone(),
        Arc::new(fetcher),
        CheckSettings::default(),
    ));
    let (trigger, _worker) = CheckTrigger::spawn(checker);
    let app = router(Arc::new(AppState::new(store.clone(), trigger)));
    Harness { app, store }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// =========================================================================
// Keywords
// =========================================================================

#[tokio::test]
async fn add_keyword_trims_and_returns_created() {
    let h = harness(MockFetcher::new());

    let (status, body) = send(&h.app, "POST", "/api/keywords", Some(json!({"keyword": "  flat whites "}))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["keyword"], "flat whites");
    assert!(body["id"].is_string());
}

#[tokio::test]
async fn blank_keyword_is_bad_request() {
    let h = harness(MockFetcher::new());

    let (status, body) = send(&h.app, "POST", "/api/keywords", Some(json!({"keyword": "   "}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Keyword is required");
}

#[tokio::test]
async fn duplicate_keyword_is_conflict() {
    let h = harness(MockFetcher::new());
    send(&h.app, "POST", "/api/keywords", Some(json!({"keyword": "tea"}))).await;

    let (status, _) = send(&h.app, "POST", "/api/keywords", Some(json!({"keyword": "tea"}))).await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn keywords_list_and_delete() {
    let h = harness(MockFetcher::new());
    let (_, added) = send(&h.app, "POST", "/api/keywords", Some(json!({"keyword": "tea"}))).await;
    let id = added["id"].as_str().unwrap().to_string();

    let (status, list) = send(&h.app, "GET", "/api/keywords", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = send(&h.app, "DELETE", &format!("/api/keywords/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&h.app, "DELETE", &format!("/api/keywords/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Keyword not found");
}

// =========================================================================
// Tracking config
// =========================================================================

#[tokio::test]
async fn config_defaults_to_empty() {
    let h = harness(MockFetcher::new());

    let (status, body) = send(&h.app, "GET", "/api/config", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"url": "", "competitor_urls": []}));
}

#[tokio::test]
async fn config_save_cleans_competitors() {
    let h = harness(MockFetcher::new());

    let (status, body) = send(
        &h.app,
        "PUT",
        "/api/config",
        Some(json!({"url": " example.com ", "competitor_urls": ["rival.com", "", "example.com", "rival.com"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"url": "example.com", "competitor_urls": ["rival.com"]}));

    let (_, fetched) = send(&h.app, "GET", "/api/config", None).await;
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn config_without_target_is_bad_request() {
    let h = harness(MockFetcher::new());

    let (status, body) = send(&h.app, "PUT", "/api/config", Some(json!({"url": "  "}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Target URL is required");
}

// =========================================================================
// Rankings
// =========================================================================

#[tokio::test]
async fn ingest_then_read_rankings() {
    let h = harness(MockFetcher::new());
    h.store
        .save_tracking_config(&TrackingConfig::new("example.com", ["rival.com"]).unwrap())
        .await
        .unwrap();
    let kw = h.store.insert_keyword("coffee").await.unwrap();

    let (status, body) = send(
        &h.app,
        "POST",
        "/api/rankings",
        Some(json!([
            {"keyword_id": kw.id, "url": "example.com", "position": 5, "check_date": "2026-01-01T00:00:00Z"},
            {"keyword_id": kw.id, "url": "example.com", "position": 3, "check_date": "2026-01-02T00:00:00Z"},
            {"keyword_id": kw.id, "url": "rival.com", "position": 0},
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["inserted"], 2);
    assert_eq!(body["rejected"], 1);

    let (status, rankings) = send(&h.app, "GET", &format!("/api/rankings?keyword_id={}", kw.id), None).await;
    assert_eq!(status, StatusCode::OK);

    let rows = rankings[0]["url_data"].as_array().unwrap();
    assert_eq!(rows[0]["url"], "example.com");
    assert_eq!(rows[0]["is_target"], true);
    assert_eq!(rows[0]["current_rank"], 3);
    assert_eq!(rows[0]["change"], "+2");
    assert_eq!(rows[1]["url"], "rival.com");
    assert_eq!(rows[1]["change"], Value::Null);
}

#[tokio::test]
async fn rankings_for_unknown_keyword_is_not_found() {
    let h = harness(MockFetcher::new());

    let (status, _) = send(
        &h.app,
        "GET",
        &format!("/api/rankings?keyword_id={}", uuid::Uuid::new_v4()),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rankings_without_keywords_is_empty_list() {
    let h = harness(MockFetcher::new());

    let (status, body) = send(&h.app, "GET", "/api/rankings", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn ingest_keeps_valid_entries_beside_malformed_ones() {
    let h = harness(MockFetcher::new());
    let kw = h.store.insert_keyword("coffee").await.unwrap();

    let (status, body) = send(
        &h.app,
        "POST",
        "/api/rankings",
        Some(json!([
            {"keyword_id": kw.id, "url": "example.com", "position": 4},
            {"keyword_id": "not-a-uuid", "url": "example.com", "position": 1},
            {"keyword_id": kw.id, "position": 2},
        ])),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["inserted"], 1);
    assert_eq!(body["rejected"], 2);

    let stored = h.store.observations().await;
    assert_eq!(stored.len(), 1);
    assert_eq!((stored[0].url.as_str(), stored[0].position), ("example.com", 4));
}

#[tokio::test]
async fn ingest_requires_an_array() {
    let h = harness(MockFetcher::new());

    let (status, body) = send(&h.app, "POST", "/api/rankings", Some(json!({"url": "a.com"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Request body must be an array.");
}

#[tokio::test]
async fn ingest_with_nothing_valid_is_ok() {
    let h = harness(MockFetcher::new());

    let (status, body) = send(&h.app, "POST", "/api/rankings", Some(json!([]))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No valid ranking entries to insert.");
}

// =========================================================================
// Rank check trigger
// =========================================================================

#[tokio::test(start_paused = true)]
async fn check_ranks_is_accepted_and_runs_in_background() {
    let h = harness(MockFetcher::new().on_search("coffee", &["https://www.example.com/"]));
    h.store
        .save_tracking_config(&TrackingConfig::new("example.com", Vec::<String>::new()).unwrap())
        .await
        .unwrap();
    h.store.insert_keyword("coffee").await.unwrap();

    let (status, body) = send(&h.app, "POST", "/api/check-ranks", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["message"], "Rank checking job started.");

    for _ in 0..50 {
        if !h.store.observations().await.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    let stored = h.store.observations().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].position, 1);
}

#[tokio::test]
async fn health_check() {
    let h = harness(MockFetcher::new());

    let response = h
        .app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
