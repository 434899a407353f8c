use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use sqlx::any::AnyPoolOptions;
use tower::ServiceExt;

use packshipper::api::{self, AppState};
use packshipper::cache::ResultCache;
use packshipper::coordinator::{CoordinatorConfig, RequestCoordinator};
use packshipper::journal::SqlxOrderJournal;
use packshipper::ratelimit::RateLimiter;
use packshipper::store::SqlxPackStore;

async fn test_state() -> AppState {
    sqlx::any::install_default_drivers();

    let db_name = uuid::Uuid::new_v4().to_string();
    let conn_str = format!("sqlite:file:{db_name}?mode=memory&cache=shared");
    let pool = AnyPoolOptions::new()
        .max_connections(5)
        .connect(&conn_str)
        .await
        .unwrap();
    packshipper::db::schema::migrate(&pool).await.unwrap();

    let store = Arc::new(SqlxPackStore::new(pool.clone()));
    for size in [250u64, 500, 1000, 2000, 5000] {
        store.add(size).await.unwrap();
    }
    let journal = Arc::new(SqlxOrderJournal::new(pool));
    let cache = Arc::new(ResultCache::new(100));

    let coordinator = Arc::new(RequestCoordinator::new(
        store,
        journal,
        cache,
        CoordinatorConfig {
            amount_max: 10_000_000,
            cache_ttl: Duration::from_secs(3600),
            order_history_default_limit: 100,
            order_history_max_limit: 1000,
        },
    ));

    AppState {
        coordinator,
        rate_limiter: Arc::new(RateLimiter::new(1_000, Duration::from_millis(1))),
        api_key: None,
    }
}

fn connect_info_request(method: &str, uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .extension(axum::extract::ConnectInfo(std::net::SocketAddr::from((
            [127, 0, 0, 1],
            1234,
        ))))
        .body(body)
        .unwrap()
}

#[tokio::test]
async fn calculate_endpoint_returns_expected_solution() {
    let router = api::build_router(test_state().await);

    let req = connect_info_request(
        "POST",
        "/api/calculate",
        Body::from(json!({"amount": 251}).to_string()),
    );

    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["total_items"], 500);
    assert_eq!(body["total_packs"], 1);
    assert_eq!(body["packs"]["500"], 1);
}

#[tokio::test]
async fn calculate_endpoint_rejects_zero_amount() {
    let router = api::build_router(test_state().await);

    let req = connect_info_request(
        "POST",
        "/api/calculate",
        Body::from(json!({"amount": 0}).to_string()),
    );

    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn calculate_endpoint_rejects_negative_amount_as_400_not_422() {
    let router = api::build_router(test_state().await);

    let req = connect_info_request(
        "POST",
        "/api/calculate",
        Body::from(json!({"amount": -1}).to_string()),
    );

    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn calculate_endpoint_rejects_non_integer_amount_as_400_not_422() {
    let router = api::build_router(test_state().await);

    let req = connect_info_request(
        "POST",
        "/api/calculate",
        Body::from(json!({"amount": 1.5}).to_string()),
    );

    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_endpoint_reports_cache_stats() {
    let router = api::build_router(test_state().await);

    let req = connect_info_request("GET", "/health", Body::empty());
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["cache"]["hits"], 0);
}

#[tokio::test]
async fn pack_lifecycle_via_http() {
    let router = api::build_router(test_state().await);

    let list_req = connect_info_request("GET", "/api/packs", Body::empty());
    let resp = router.clone().oneshot(list_req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let create_req = connect_info_request(
        "POST",
        "/api/packs",
        Body::from(json!({"size": 750}).to_string()),
    );
    let resp = router.clone().oneshot(create_req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let dup_req = connect_info_request(
        "POST",
        "/api/packs",
        Body::from(json!({"size": 750}).to_string()),
    );
    let resp = router.clone().oneshot(dup_req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let delete_req = connect_info_request("DELETE", "/api/packs/750", Body::empty());
    let resp = router.clone().oneshot(delete_req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let delete_again_req = connect_info_request("DELETE", "/api/packs/750", Body::empty());
    let resp = router.oneshot(delete_again_req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rate_limiter_returns_429_once_exhausted() {
    let mut state = test_state().await;
    state.rate_limiter = Arc::new(RateLimiter::new(1, Duration::from_secs(10)));
    let router = api::build_router(state);

    let first = connect_info_request("GET", "/health", Body::empty());
    let resp = router.clone().oneshot(first).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let second = connect_info_request("GET", "/health", Body::empty());
    let resp = router.oneshot(second).await.unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}
