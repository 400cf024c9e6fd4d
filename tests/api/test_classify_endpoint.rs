// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /predict/tensorflow tests with a mocked classifier

use super::support::*;
use axum::http::StatusCode;
use footscan_api::vision::ModelError;

#[tokio::test]
async fn test_classify_returns_top_class() {
    let mut classifier = classifier();
    classifier
        .expect_predict()
        .times(1)
        .returning(|_| Ok(vec![0.3, 0.7]));
    let app = TestApp::new(detector(), classifier);

    let response = app
        .send(upload_request("/predict/tensorflow", Some("foot.jpg"), &png_bytes(32, 32)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["class"], "Normal");
    let confidence = json["confidence"].as_f64().unwrap();
    assert!((confidence - 0.7).abs() < 1e-6);
}

#[tokio::test]
async fn test_classify_class_is_from_label_set() {
    let mut classifier = classifier();
    classifier
        .expect_predict()
        .returning(|_| Ok(vec![0.95, 0.05]));
    let app = TestApp::new(detector(), classifier);

    let response = app
        .send(upload_request("/predict/tensorflow", Some("x.png"), &png_bytes(8, 8)))
        .await;
    let json = body_json(response).await;

    let class = json["class"].as_str().unwrap();
    assert!(["Hallux Valgus", "Normal"].contains(&class));
    assert_eq!(class, "Hallux Valgus");
    let confidence = json["confidence"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&confidence));
}

#[tokio::test]
async fn test_classify_writes_no_files() {
    let mut classifier = classifier();
    classifier.expect_predict().returning(|_| Ok(vec![0.5, 0.5]));
    let app = TestApp::new(detector(), classifier);

    let response = app
        .send(upload_request("/predict/tensorflow", Some("foot.jpg"), &png_bytes(8, 8)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // ties go to the first class
    let json = body_json(response).await;
    assert_eq!(json["class"], "Hallux Valgus");
    assert!(app.output_files().is_empty());
}

#[tokio::test]
async fn test_classify_rejects_non_image() {
    let mut classifier = classifier();
    classifier.expect_predict().never();
    let app = TestApp::new(detector(), classifier);

    let response = app
        .send(upload_request("/predict/tensorflow", Some("foot.jpg"), b"%PDF-1.7 not an image"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_classify_rejects_empty_upload() {
    let mut classifier = classifier();
    classifier.expect_predict().never();
    let app = TestApp::new(detector(), classifier);

    let response = app
        .send(upload_request("/predict/tensorflow", Some("empty.png"), b""))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_classify_output_length_mismatch() {
    let mut classifier = classifier();
    classifier
        .expect_predict()
        .returning(|_| Ok(vec![0.2, 0.3, 0.5]));
    let app = TestApp::new(detector(), classifier);

    let response = app
        .send(upload_request("/predict/tensorflow", Some("foot.jpg"), &png_bytes(8, 8)))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_classify_model_failure() {
    let mut classifier = classifier();
    classifier
        .expect_predict()
        .returning(|_| Err(ModelError::Inference("session failed".to_string())));
    let app = TestApp::new(detector(), classifier);

    let response = app
        .send(upload_request("/predict/tensorflow", Some("foot.jpg"), &png_bytes(8, 8)))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("session failed"));
}
