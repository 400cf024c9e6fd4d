// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX image classifier (Keras export)

use anyhow::Result;
use image::DynamicImage;
use ort::session::Session;
use ort::value::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::postprocessing::to_probabilities;
use super::preprocessing::{to_nhwc_tensor, CLASSIFIER_INPUT_SIZE};
use crate::vision::labels::LabelMap;
use crate::vision::model::{ImageClassifier, ModelError};
use crate::vision::session::{first_input_name, load_cpu_session};

/// Configuration for loading the classifier
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Path to the ONNX export of the classification model
    pub model_path: PathBuf,
    /// Square input size the model expects
    pub input_size: u32,
    /// Multiplier applied to raw 0-255 pixel values
    pub pixel_scale: f32,
    /// Class names in model output order
    pub labels: LabelMap,
    pub intra_threads: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./models/hallux_valgus_model.onnx"),
            input_size: CLASSIFIER_INPUT_SIZE,
            pixel_scale: 1.0,
            labels: LabelMap::classification_default(),
            intra_threads: 4,
        }
    }
}

/// Classifier backed by ONNX Runtime
///
/// Like the detector, session access is serialised by a mutex.
#[derive(Clone)]
pub struct OnnxClassifier {
    session: Arc<Mutex<Session>>,
    input_name: String,
    input_size: u32,
    pixel_scale: f32,
    labels: LabelMap,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("input_name", &self.input_name)
            .field("input_size", &self.input_size)
            .field("pixel_scale", &self.pixel_scale)
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}

impl OnnxClassifier {
    /// Load the classifier, failing if the artifact is missing or invalid
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        let session = load_cpu_session(&config.model_path, config.intra_threads)?;
        let input_name = first_input_name(&session, "input");

        info!(
            "✅ Classifier loaded (input: {}, size: {}, classes: {:?})",
            input_name,
            config.input_size,
            config.labels.as_slice()
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            input_size: config.input_size,
            pixel_scale: config.pixel_scale,
            labels: config.labels,
        })
    }
}

impl ImageClassifier for OnnxClassifier {
    fn predict(&self, image: &DynamicImage) -> Result<Vec<f32>, ModelError> {
        let input = to_nhwc_tensor(image, self.input_size, self.pixel_scale)?;
        let input_value = Value::from_array(input)?;

        let raw: Vec<f32> = {
            let mut session = self.session.lock().map_err(|_| {
                ModelError::Inference("classifier session lock poisoned".to_string())
            })?;

            let outputs = session.run(ort::inputs![&self.input_name => input_value])?;
            let output_tensor = outputs[0].try_extract_array::<f32>()?;
            debug!("Classifier output shape: {:?}", output_tensor.shape());

            // [1, classes] or [classes]; either way the batch holds one image
            output_tensor.iter().copied().collect()
        };

        to_probabilities(&raw)
    }

    fn labels(&self) -> &LabelMap {
        &self.labels
    }
}
