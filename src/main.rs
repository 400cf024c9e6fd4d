// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use footscan_api::{
    api::{build_cors_layer, start_server, AppState},
    config::ServerConfig,
    storage::AnnotatedImageStore,
    vision::{OverlayRenderer, VisionModelManager},
};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = ServerConfig::parse();
    config.validate().context("Invalid configuration")?;
    let public_base_url = config.public_base_url()?;

    tracing::info!("Starting footscan-api v{}", env!("CARGO_PKG_VERSION"));

    let store = AnnotatedImageStore::new(&config.output_dir)?;
    tracing::info!("Annotated images directory: {}", store.output_dir().display());

    // Both models are required; a missing artifact aborts startup
    let manager = VisionModelManager::new(config.vision_config())?;
    for model in manager.list_models() {
        tracing::info!(
            "Model {} ({}): {} labels={:?}",
            model.name,
            model.model_type,
            model.path.display(),
            model.labels
        );
    }

    let overlay = OverlayRenderer::from_optional_font(config.font_path.as_deref())?;
    if !overlay.has_font() {
        tracing::info!("No overlay font configured or found, drawing boxes without labels");
    }

    let cors = build_cors_layer(&config.cors_origins);
    let state = AppState::from_manager(
        &manager,
        overlay,
        store,
        public_base_url,
        config.max_upload_bytes,
    );

    start_server(&config.bind_address(), state, cors).await
}
