// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX Runtime session loading shared by both vision models

use anyhow::{Context, Result};
use ort::ep::CPU as CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use std::path::Path;
use tracing::{debug, info};

/// Load an ONNX model on the CPU execution provider
///
/// Fails before touching ONNX Runtime if the artifact does not exist, so
/// a bad path surfaces as a clear startup error.
pub fn load_cpu_session(model_path: &Path, intra_threads: usize) -> Result<Session> {
    if !model_path.exists() {
        anyhow::bail!("Model artifact not found: {}", model_path.display());
    }

    info!("Loading ONNX model from {}", model_path.display());

    let session = Session::builder()
        .map_err(ort::Error::<()>::from)
        .context("Failed to create session builder")?
        .with_execution_providers([CPUExecutionProvider::default().build()])
        .map_err(ort::Error::<()>::from)
        .context("Failed to set CPU execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(ort::Error::<()>::from)
        .context("Failed to set optimization level")?
        .with_intra_threads(intra_threads.max(1))
        .map_err(ort::Error::<()>::from)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path)
        .context(format!(
            "Failed to load ONNX model from {}",
            model_path.display()
        ))?;

    if let Some(input) = session.inputs().first() {
        debug!("Model input {}: {:?}", input.name(), input.dtype());
    }

    Ok(session)
}

/// First input name, or a fallback when the model does not declare one
pub fn first_input_name(session: &Session, fallback: &str) -> String {
    session
        .inputs()
        .first()
        .map(|input| input.name().to_string())
        .unwrap_or_else(|| fallback.to_string())
}
