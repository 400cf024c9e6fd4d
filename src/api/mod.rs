// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod annotated_images;
pub mod classify;
pub mod detect;
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod upload;

pub use annotated_images::annotated_image_handler;
pub use classify::{classify_handler, ClassifyResponse};
pub use detect::{detect_handler, DetectResponse, Prediction};
pub use errors::{ApiError, ErrorResponse, IMAGE_NOT_FOUND};
pub use handlers::{ping_handler, PingResponse};
pub use http_server::{build_cors_layer, create_router, start_server, AppState};
pub use upload::{read_upload, UploadedImage};
