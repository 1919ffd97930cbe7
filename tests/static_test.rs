use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

use filmotheque::api::state::AppState;
use filmotheque::api::{open_store, router};
use filmotheque::config::Config;

/// App serving `public/` from the temp dir, with optional CORS origins
fn build_app(origins: &[&str]) -> (Router, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let public = temp_dir.path().join("public");
    std::fs::create_dir_all(&public).unwrap();
    std::fs::write(public.join("index.html"), "<h1>Filmotheque</h1>").unwrap();

    let mut config = Config::default();
    config.server.data_path = temp_dir.path().join("store");
    config.server.public_dir = public;
    config.cors.allowed_origins = origins.iter().map(|o| o.to_string()).collect();

    let store = open_store(&config.server.data_path).expect("Failed to open test store");
    let state = AppState::new(config, Arc::new(store));

    (router(state), temp_dir)
}

#[tokio::test]
async fn test_serves_static_file() {
    let (app, _temp_dir) = build_app(&[]);

    let request = Request::builder()
        .uri("/index.html")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"<h1>Filmotheque</h1>");
}

#[tokio::test]
async fn test_missing_static_file_is_json_404() {
    let (app, _temp_dir) = build_app(&[]);

    let request = Request::builder()
        .uri("/missing.css")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["kind"], "not_found");
}

#[tokio::test]
async fn test_cors_permissive_by_default() {
    let (app, _temp_dir) = build_app(&[]);

    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://anywhere.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_cors_restricted_origins() {
    let (app, _temp_dir) = build_app(&["https://films.example"]);

    let allowed = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://films.example")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(allowed).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://films.example"
    );

    let denied = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(denied).await.unwrap();
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}
