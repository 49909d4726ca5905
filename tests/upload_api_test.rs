//! Tests for the avatar upload endpoint

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use chatrelay::http::create_router;
use chatrelay::{AppState, Config};

const BOUNDARY: &str = "X-CHATRELAY-TEST-BOUNDARY";

fn state_with_uploads_dir(uploads_dir: &std::path::Path) -> AppState {
    let mut config = Config::default();
    config.http.uploads_dir = uploads_dir.to_path_buf();
    AppState::new(Arc::new(config))
}

fn multipart_request(field_name: &str, file_name: &str, contents: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field_name, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::post("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn upload_stores_file_and_returns_public_url() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(state_with_uploads_dir(dir.path()));

    let response = app
        .oneshot(multipart_request("avatar-file", "me.png", b"fake-png-bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["success"], true);

    let url = json["url"].as_str().unwrap();
    assert!(url.starts_with("/user-"), "unexpected url: {}", url);
    assert!(url.ends_with(".png"), "unexpected url: {}", url);

    // The returned URL maps to a real file in the uploads directory.
    let stored = dir.path().join(url.trim_start_matches('/'));
    assert_eq!(std::fs::read(stored).unwrap(), b"fake-png-bytes");
}

#[tokio::test]
async fn upload_without_the_expected_field_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(state_with_uploads_dir(dir.path()));

    let response = app
        .oneshot(multipart_request("something-else", "me.png", b"bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.http.uploads_dir = dir.path().to_path_buf();
    config.http.max_upload_bytes = 1024;
    let app = create_router(AppState::new(Arc::new(config)));

    let big = vec![0u8; 4096];
    let response = app
        .oneshot(multipart_request("avatar-file", "big.png", &big))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn filename_without_extension_still_uploads() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(state_with_uploads_dir(dir.path()));

    let response = app
        .oneshot(multipart_request("avatar-file", "avatar", b"raw"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let url = json["url"].as_str().unwrap();
    assert!(url.starts_with("/user-"));
    assert!(!url.contains('.'), "unexpected extension in {}", url);
}
