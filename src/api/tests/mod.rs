use super::*;
use crate::Config;
use crate::catalog::test_helpers::FakeSource;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;


/// Config with a small page size so a few fake items span several pages
fn test_config() -> Config {
    let mut config = Config::default();
    config.tmdb.api_key = "test-key".to_string();
    config.catalog.page_size = 2;
    config
}

fn test_state(source: FakeSource) -> AppState {
    AppState::new(Arc::new(test_config()), Arc::new(source))
}

/// Six movies, all released today, on three upstream pages
fn six_recent_movies() -> FakeSource {
    FakeSource::uniform(3, 2, chrono::Utc::now().date_naive())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_cors_enabled() {
    let app = create_router(test_state(FakeSource::new()));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let allow_origin = response
        .headers()
        .get("access-control-allow-origin")
        .expect("CORS header should be present");
    assert_eq!(allow_origin, "*");
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = create_router(test_state(FakeSource::new()));

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/catalog/movie/recent_movies.json")
        .header("Origin", "https://web.strem.io")
        .header("Access-Control-Request-Method", "GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("access-control-allow-methods"));
}

#[tokio::test]
async fn test_cors_specific_origins() {
    let mut config = test_config();
    config.api.cors_origins = vec!["https://web.strem.io".to_string()];
    let app = create_router(AppState::new(Arc::new(config), Arc::new(FakeSource::new())));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "https://web.strem.io")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "https://web.strem.io"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let mut config = test_config();
    config.api.cors_enabled = false;
    let app = create_router(AppState::new(Arc::new(config), Arc::new(FakeSource::new())));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
}

#[tokio::test]
async fn test_serve_stops_on_cancellation() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();

    let server = tokio::spawn(serve(
        listener,
        test_state(FakeSource::new()),
        shutdown.clone(),
    ));

    let body: serde_json::Value = reqwest::get(format!("http://{}/health", address))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");

    shutdown.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server should stop after cancellation")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_start_api_server_reports_bind_failure() {
    let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mut config = test_config();
    config.api.bind_address = occupied.local_addr().unwrap();

    let state = AppState::new(Arc::new(config), Arc::new(FakeSource::new()));
    let result = start_api_server(state, CancellationToken::new()).await;

    assert!(matches!(result, Err(Error::Io(_))));
}
