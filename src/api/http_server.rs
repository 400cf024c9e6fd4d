// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use url::Url;

use super::annotated_images::annotated_image_handler;
use super::classify::classify_handler;
use super::detect::detect_handler;
use super::errors::ApiError;
use super::handlers::ping_handler;
use crate::storage::AnnotatedImageStore;
use crate::vision::{ImageClassifier, ObjectDetector, OverlayRenderer, VisionModelManager};

/// Route prefix for served overlays
pub const ANNOTATED_ROUTE: &str = "annotated_images";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<dyn ObjectDetector>,
    pub classifier: Arc<dyn ImageClassifier>,
    pub overlay: Arc<OverlayRenderer>,
    pub store: Arc<AnnotatedImageStore>,
    pub public_base_url: Url,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        detector: Arc<dyn ObjectDetector>,
        classifier: Arc<dyn ImageClassifier>,
        overlay: OverlayRenderer,
        store: AnnotatedImageStore,
        public_base_url: Url,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            detector,
            classifier,
            overlay: Arc::new(overlay),
            store: Arc::new(store),
            public_base_url,
            max_upload_bytes,
        }
    }

    pub fn from_manager(
        manager: &VisionModelManager,
        overlay: OverlayRenderer,
        store: AnnotatedImageStore,
        public_base_url: Url,
        max_upload_bytes: usize,
    ) -> Self {
        Self::new(
            manager.detector(),
            manager.classifier(),
            overlay,
            store,
            public_base_url,
            max_upload_bytes,
        )
    }

    /// Public URL of an annotated file; the name is encoded as one segment
    pub fn annotated_image_url(&self, file_name: &str) -> Result<String, ApiError> {
        let mut url = self.public_base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Internal("public base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(ANNOTATED_ROUTE)
            .push(file_name);
        Ok(url.to_string())
    }
}

/// CORS restricted to `origins`, with credentials
///
/// Methods and headers mirror the preflight request since wildcards are
/// not allowed together with credentials.
pub fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            let origin = origin.trim().trim_end_matches('/');
            match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                    None
                }
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(64 * 1024);

    Router::new()
        // Health check
        .route("/ping", get(ping_handler))
        // Prediction endpoints
        .route("/predict/yolo", post(detect_handler))
        .route("/predict/tensorflow", post(classify_handler))
        // Rendered overlays
        .route("/annotated_images/", get(annotated_image_handler))
        .route("/annotated_images/*path", get(annotated_image_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C
pub async fn start_server(addr: &str, state: AppState, cors: CorsLayer) -> anyhow::Result<()> {
    let app = create_router(state, cors);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("✅ API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
