//! Common Test Utilities for Integration Tests
//!
//! Shared helpers used across integration test modules.

use axum::{
    Json, Router,
    body::Body,
    http::{Request, StatusCode},
    routing::get,
};
use reefpoint_server::config::Config;
use reefpoint_server::state::AppState;
use reefpoint_server::{export_routes, source_routes, upload_routes};
use serde::Serialize;
use serde_json::{Value, json};
use tower::util::ServiceExt;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Create a test application router with state
#[allow(dead_code)]
pub fn create_test_app_with_state() -> (Router, AppState) {
    let state = AppState::new(Config::default());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = source_routes(state.clone())
        .merge(upload_routes(state.clone()))
        .merge(export_routes(state.clone()));

    let app = Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(cors);

    (app, state)
}

/// Create a test application router with all routes configured
pub fn create_test_app() -> Router {
    create_test_app_with_state().0
}

/// Make a GET request and parse the JSON response body
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("Failed to build request"),
        )
        .await
        .expect("Failed to execute request");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

/// Make a GET request and return the raw body text
pub async fn get_text(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("Failed to build request"),
        )
        .await
        .expect("Failed to execute request");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    (status, String::from_utf8_lossy(&body).into_owned())
}

/// Make a POST request with a JSON body and parse the JSON response
pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("Failed to build request"),
        )
        .await
        .expect("Failed to execute request");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

/// Register the standard test image and label set; returns the image id.
///
/// The image is 1152x864 px, named with nested path components so CPC
/// path matching has something to chew on.
pub async fn seed_source(app: &Router) -> Uuid {
    let (status, image) = post_json(
        app,
        "/api/images",
        json!({"name": "Site A/Transect 1/01.jpg", "width": 1152, "height": 864}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = post_json(
        app,
        "/api/labelset",
        json!({"labels": [
            {"name": "Pocillopora", "code": "POC"},
            {"name": "Pocillopora (branching)", "code": "POC+BL"},
            {"name": "Crustose coralline algae", "code": "CCA"},
        ]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    image["id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("image id in response")
}

/// A well-formed two-point CPC file in exactly the shape the writer emits:
/// quoted paths and label tokens, CRLF endings, full 28-header budget.
pub fn sample_cpc(image_path: &str) -> String {
    let mut lines = vec![
        format!(
            r#""C:\CPCe codes\codes.txt","{}",17280,12960,1152,864"#,
            image_path
        ),
        "0,12960".to_string(),
        "17280,12960".to_string(),
        "17280,0".to_string(),
        "0,0".to_string(),
        "2".to_string(),
        "4410,1020".to_string(),
        "9825,7005".to_string(),
        r#""1","POC","Notes","BL""#.to_string(),
        r#""2","CCA","Notes","""#.to_string(),
        r#""Site A""#.to_string(),
    ];
    for _ in 0..27 {
        lines.push(r#""""#.to_string());
    }
    lines.join("\r\n") + "\r\n"
}
