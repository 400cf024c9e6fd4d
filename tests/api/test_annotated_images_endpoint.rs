// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET /annotated_images/* tests: serving, 404s and traversal attempts

use super::support::*;
use axum::http::{header, StatusCode};
use serde_json::json;

async fn assert_not_found(app: &TestApp, uri: &str) {
    let response = app.get(uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri: {}", uri);
    assert_eq!(body_json(response).await, json!({ "error": "Image not found" }));
}

#[tokio::test]
async fn test_missing_image_returns_404() {
    let app = TestApp::new(detector(), classifier());
    assert_not_found(&app, "/annotated_images/does-not-exist.png").await;
}

#[tokio::test]
async fn test_existing_image_is_served() {
    let app = TestApp::new(detector(), classifier());
    let png = png_bytes(10, 10);
    std::fs::write(app.output_dir.join("annotated_a.png"), &png).unwrap();

    let response = app.get("/annotated_images/annotated_a.png").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(body_bytes(response).await, png);
}

#[tokio::test]
async fn test_content_type_follows_extension() {
    let app = TestApp::new(detector(), classifier());
    std::fs::write(app.output_dir.join("photo.jpg"), b"\xFF\xD8\xFF").unwrap();
    std::fs::write(app.output_dir.join("blob.bin"), b"data").unwrap();

    let response = app.get("/annotated_images/photo.jpg").await;
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");

    let response = app.get("/annotated_images/blob.bin").await;
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/octet-stream"
    );
}

#[tokio::test]
async fn test_nested_file_is_served() {
    let app = TestApp::new(detector(), classifier());
    std::fs::create_dir(app.output_dir.join("sub")).unwrap();
    std::fs::write(app.output_dir.join("sub").join("x.png"), png_bytes(2, 2)).unwrap();

    let response = app.get("/annotated_images/sub/x.png").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_directory_is_not_served() {
    let app = TestApp::new(detector(), classifier());
    std::fs::create_dir(app.output_dir.join("sub")).unwrap();
    assert_not_found(&app, "/annotated_images/sub").await;
}

#[tokio::test]
async fn test_traversal_never_escapes_output_dir() {
    let app = TestApp::new(detector(), classifier());
    std::fs::write(app.root.path().join("secret.txt"), b"secret").unwrap();

    for uri in [
        "/annotated_images/../secret.txt",
        "/annotated_images/../../etc/passwd",
        "/annotated_images/%2e%2e/secret.txt",
        "/annotated_images/%2e%2e%2fsecret.txt",
        "/annotated_images/..%2F..%2Fetc%2Fpasswd",
        "/annotated_images/%2Fetc%2Fpasswd",
        "/annotated_images/sub/../../secret.txt",
    ] {
        assert_not_found(&app, uri).await;
    }
}

#[tokio::test]
async fn test_empty_path_returns_404_body() {
    let app = TestApp::new(detector(), classifier());
    assert_not_found(&app, "/annotated_images/").await;
}

#[tokio::test]
async fn test_non_utf8_path_returns_404_body() {
    let app = TestApp::new(detector(), classifier());
    std::fs::write(app.output_dir.join("annotated_a.png"), png_bytes(2, 2)).unwrap();

    for uri in ["/annotated_images/%FF", "/annotated_images/annotated_%C3%28.png"] {
        assert_not_found(&app, uri).await;
    }
}
