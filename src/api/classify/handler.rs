// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classification endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use std::time::Instant;
use tracing::{debug, info};

use super::response::ClassifyResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::upload::read_upload;
use crate::vision::classifier::top_class;
use crate::vision::{decode_image_bytes_with_limit, LabelMap, ModelError};

/// POST /predict/tensorflow - Classify an image
///
/// # Errors
/// - 400 Bad Request: missing field or undecodable image
/// - 500 Internal Server Error: inference failed or the output does not match the labels
pub async fn classify_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let start = Instant::now();

    let upload = read_upload(multipart).await?;
    let (image, image_info) = decode_image_bytes_with_limit(&upload.bytes, state.max_upload_bytes)?;
    debug!(
        "Decoded image: {}x{}, {:?}",
        image_info.width, image_info.height, image_info.format
    );

    let classifier = state.classifier.clone();
    let response = tokio::task::spawn_blocking(move || -> Result<ClassifyResponse, ApiError> {
        let probabilities = classifier.predict(&image)?;
        pick_class(&probabilities, classifier.labels()).map_err(ApiError::from)
    })
    .await??;

    info!(
        "Classification complete: {} ({:.3}), {}ms",
        response.class_name,
        response.confidence,
        start.elapsed().as_millis()
    );

    Ok(Json(response))
}

/// Argmax over the probabilities, named through the classifier's labels
pub fn pick_class(probabilities: &[f32], labels: &LabelMap) -> Result<ClassifyResponse, ModelError> {
    if probabilities.len() != labels.len() {
        return Err(ModelError::UnexpectedOutput(format!(
            "classifier returned {} scores for {} labels",
            probabilities.len(),
            labels.len()
        )));
    }

    let (index, confidence) = top_class(probabilities)
        .ok_or_else(|| ModelError::UnexpectedOutput("classifier returned no scores".to_string()))?;

    Ok(ClassifyResponse {
        class_name: labels.label_for(index).to_string(),
        confidence: confidence.clamp(0.0, 1.0),
    })
}
