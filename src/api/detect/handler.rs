// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use image::DynamicImage;
use std::time::Instant;
use tracing::{debug, info};

use super::response::{DetectResponse, Prediction};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::upload::read_upload;
use crate::storage::{annotated_file_name, StorageError};
use crate::vision::{decode_image_bytes_with_limit, encode_png};

/// POST /predict/yolo - Detect objects and render an annotated copy
///
/// # Request
/// Multipart form with the image in the `file` field.
///
/// # Response
/// - `predictions`: label, confidence and `[x1, y1, x2, y2]` per detection
/// - `annotated_image_url`: where the rendered overlay can be fetched
///
/// # Errors
/// - 400 Bad Request: missing field or undecodable image
/// - 500 Internal Server Error: inference failed or the overlay could not be written
pub async fn detect_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<DetectResponse>, ApiError> {
    let start = Instant::now();

    let upload = read_upload(multipart).await?;
    let (image, image_info) = decode_image_bytes_with_limit(&upload.bytes, state.max_upload_bytes)?;
    debug!(
        "Decoded image: {}x{}, {:?}, {} bytes",
        image_info.width, image_info.height, image_info.format, image_info.size_bytes
    );

    let file_name = annotated_file_name(upload.file_name.as_deref());
    let annotated_image_url = state.annotated_image_url(&file_name)?;

    let detector = state.detector.clone();
    let overlay = state.overlay.clone();
    let store = state.store.clone();
    let target = file_name.clone();

    // Inference, drawing and encoding are CPU-bound
    let predictions = tokio::task::spawn_blocking(move || -> Result<Vec<Prediction>, ApiError> {
        let detections = detector.detect(&image)?;
        let labels = detector.labels();

        let canvas = overlay.render(&image, &detections, labels);
        let png = encode_png(&DynamicImage::ImageRgb8(canvas))
            .map_err(|e| StorageError::Encode(e.to_string()))?;
        store.save(&target, &png)?;

        Ok(detections
            .iter()
            .map(|d| Prediction::from_detection(d, labels))
            .collect())
    })
    .await??;

    info!(
        "Detection complete: {} objects, {} written, {}ms",
        predictions.len(),
        file_name,
        start.elapsed().as_millis()
    );

    Ok(Json(DetectResponse {
        predictions,
        annotated_image_url,
    }))
}
