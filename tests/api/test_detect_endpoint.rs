// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /predict/yolo tests with a mocked detector

use super::support::*;
use axum::http::{header, StatusCode};
use footscan_api::vision::ModelError;

#[tokio::test]
async fn test_detect_returns_labelled_predictions() {
    let mut detector = detector();
    detector.expect_detect().times(1).returning(|_| {
        Ok(vec![
            detection(4.0, 6.0, 30.0, 40.0, 0.91, 0),
            detection(20.0, 10.0, 60.0, 50.0, 0.42, 1),
        ])
    });
    let app = TestApp::new(detector, classifier());

    let response = app
        .send(upload_request("/predict/yolo", Some("foot.jpg"), &png_bytes(64, 64)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let predictions = json["predictions"].as_array().unwrap();
    assert_eq!(predictions.len(), 2);
    assert_eq!(predictions[0]["label"], "Flat Foot");
    assert_eq!(predictions[1]["label"], "Normal");

    for prediction in predictions {
        let confidence = prediction["confidence"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&confidence));
        assert_eq!(prediction["bbox"].as_array().unwrap().len(), 4);
    }
    let bbox: Vec<f64> = predictions[0]["bbox"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect();
    assert_eq!(bbox, vec![4.0, 6.0, 30.0, 40.0]);

    assert_eq!(
        json["annotated_image_url"],
        "http://localhost:8000/annotated_images/annotated_foot.png"
    );
    assert_eq!(app.output_files(), vec!["annotated_foot.png"]);
}

#[tokio::test]
async fn test_detect_unknown_class_label() {
    let mut detector = detector();
    detector
        .expect_detect()
        .returning(|_| Ok(vec![detection(1.0, 1.0, 10.0, 10.0, 0.6, 9)]));
    let app = TestApp::new(detector, classifier());

    let response = app
        .send(upload_request("/predict/yolo", Some("scan.png"), &png_bytes(32, 32)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["predictions"][0]["label"], "Unknown");
}

#[tokio::test]
async fn test_detect_empty_result_still_writes_overlay() {
    let mut detector = detector();
    detector.expect_detect().returning(|_| Ok(vec![]));
    let app = TestApp::new(detector, classifier());

    let response = app
        .send(upload_request("/predict/yolo", Some("empty.jpeg"), &png_bytes(16, 16)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["predictions"].as_array().unwrap().len(), 0);
    assert_eq!(app.output_files(), vec!["annotated_empty.png"]);
}

#[tokio::test]
async fn test_annotated_url_serves_decodable_png() {
    let mut detector = detector();
    detector
        .expect_detect()
        .returning(|_| Ok(vec![detection(8.0, 8.0, 40.0, 30.0, 0.8, 0)]));
    let app = TestApp::new(detector, classifier());

    let response = app
        .send(upload_request("/predict/yolo", Some("left.jpg"), &png_bytes(48, 36)))
        .await;
    let json = body_json(response).await;
    let url = url::Url::parse(json["annotated_image_url"].as_str().unwrap()).unwrap();

    let response = app.get(url.path()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");

    let bytes = body_bytes(response).await;
    let overlay = image::load_from_memory(&bytes).unwrap();
    assert_eq!((overlay.width(), overlay.height()), (48, 36));
}

#[tokio::test]
async fn test_detect_without_file_name_uses_fallback() {
    let mut detector = detector();
    detector.expect_detect().returning(|_| Ok(vec![]));
    let app = TestApp::new(detector, classifier());

    let response = app
        .send(upload_request("/predict/yolo", None, &png_bytes(8, 8)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json["annotated_image_url"],
        "http://localhost:8000/annotated_images/annotated_upload.png"
    );
}

#[tokio::test]
async fn test_detect_file_name_cannot_escape_output_dir() {
    let mut detector = detector();
    detector.expect_detect().returning(|_| Ok(vec![]));
    let app = TestApp::new(detector, classifier());

    let response = app
        .send(upload_request(
            "/predict/yolo",
            Some("../../outside.jpg"),
            &png_bytes(8, 8),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.output_files(), vec!["annotated_outside.png"]);
    assert_eq!(list_files(app.root.path()), vec!["annotated_images"]);
}

#[tokio::test]
async fn test_detect_rejects_non_image() {
    let mut detector = detector();
    detector.expect_detect().never();
    let app = TestApp::new(detector, classifier());

    let response = app
        .send(upload_request("/predict/yolo", Some("notes.txt"), b"just some text"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Invalid image"));
    assert!(app.output_files().is_empty());
}

#[tokio::test]
async fn test_detect_rejects_missing_file_field() {
    let mut detector = detector();
    detector.expect_detect().never();
    let app = TestApp::new(detector, classifier());

    let body = multipart_body("image", Some("foot.png"), &png_bytes(8, 8));
    let response = app.send(multipart_request("/predict/yolo", body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_detect_rejects_oversized_upload() {
    let mut detector = detector();
    detector.expect_detect().never();
    let app = TestApp::with_limit(detector, classifier(), 64);

    let response = app
        .send(upload_request("/predict/yolo", Some("big.png"), &png_bytes(256, 256)))
        .await;
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_detect_model_failure_is_server_error() {
    let mut detector = detector();
    detector
        .expect_detect()
        .returning(|_| Err(ModelError::UnexpectedOutput("shape [1, 3]".to_string())));
    let app = TestApp::new(detector, classifier());

    let response = app
        .send(upload_request("/predict/yolo", Some("foot.jpg"), &png_bytes(16, 16)))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert!(json.get("predictions").is_none());
    assert!(json["error"].is_string());
    assert!(app.output_files().is_empty());
}

#[tokio::test]
async fn test_detect_write_failure_is_server_error() {
    let mut detector = detector();
    detector
        .expect_detect()
        .returning(|_| Ok(vec![detection(2.0, 2.0, 12.0, 12.0, 0.9, 0)]));
    let app = TestApp::new(detector, classifier());
    std::fs::remove_dir_all(&app.output_dir).unwrap();

    let response = app
        .send(upload_request("/predict/yolo", Some("foot.jpg"), &png_bytes(16, 16)))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert!(json.get("predictions").is_none());
    assert!(json.get("annotated_image_url").is_none());
    assert!(json["error"].is_string());
    assert!(!app.output_dir.exists());
}
