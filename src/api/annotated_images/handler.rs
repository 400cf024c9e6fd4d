// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Annotated image file handler

use axum::{
    body::Body,
    extract::{rejection::PathRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use image::ImageFormat;
use tracing::debug;

use crate::api::errors::ApiError;
use crate::api::http_server::AppState;

/// GET /annotated_images/*path - Serve a file from the output directory
///
/// Anything that does not resolve to a regular file inside the output
/// directory gets the same 404, including an empty path and segments that
/// do not decode to UTF-8.
pub async fn annotated_image_handler(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let path = match path {
        Ok(Path(path)) => path,
        Err(rejection) => {
            debug!("Annotated image path rejected: {}", rejection);
            return Err(ApiError::image_not_found());
        }
    };

    // canonicalize and stat hit the filesystem
    let store = state.store.clone();
    let requested = path.clone();
    let resolved = tokio::task::spawn_blocking(move || store.resolve(&requested)).await?;
    let Some(file) = resolved else {
        debug!("Annotated image not resolved: {:?}", path);
        return Err(ApiError::image_not_found());
    };

    let bytes = match tokio::fs::read(&file).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::image_not_found());
        }
        Err(e) => {
            return Err(ApiError::Internal(format!(
                "Failed to read {}: {}",
                file.display(),
                e
            )))
        }
    };

    let content_type = ImageFormat::from_path(&file)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream");

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        Body::from(bytes),
    )
        .into_response())
}
