// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart upload extraction shared by the prediction endpoints

use axum_extra::extract::Multipart;
use bytes::Bytes;
use tracing::debug;

use super::errors::ApiError;

/// Multipart field carrying the image
pub const UPLOAD_FIELD: &str = "file";

/// The `file` part of a prediction request
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Bytes,
    /// File name as sent by the client, untrusted
    pub file_name: Option<String>,
}

/// Pull the `file` field out of a multipart body, skipping any other fields
pub async fn read_upload(mut multipart: Multipart) -> Result<UploadedImage, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to read upload: {}", e)))?;

        debug!(
            "Received upload {:?} ({} bytes)",
            file_name.as_deref().unwrap_or("<unnamed>"),
            bytes.len()
        );

        return Ok(UploadedImage { bytes, file_name });
    }

    Err(ApiError::InvalidRequest(format!(
        "Missing multipart field '{}'",
        UPLOAD_FIELD
    )))
}
