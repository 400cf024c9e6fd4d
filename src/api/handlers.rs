// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::Json;
use serde::{Deserialize, Serialize};

pub const ALIVE_MESSAGE: &str = "API is alive!";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PingResponse {
    pub message: String,
}

/// GET /ping - Liveness check, never touches the models
pub async fn ping_handler() -> Json<PingResponse> {
    Json(PingResponse {
        message: ALIVE_MESSAGE.to_string(),
    })
}
